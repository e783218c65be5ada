//! Opt-in per-step execution trace, toggled by the `COMPUTORV2_TRACE`
//! environment variable. Mirrors the teacher's `SYMB_TRACE` convention
//! (`src/simplification/engine.rs`): a plain `eprintln!` behind an env-var
//! check, no logging crate.

/// `true` when `COMPUTORV2_TRACE` is set to `1` or `true` (case-insensitive).
#[must_use]
pub fn enabled() -> bool {
    std::env::var("COMPUTORV2_TRACE")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Print one trace line to stderr if tracing is enabled.
pub fn log(line: impl std::fmt::Display) {
    if enabled() {
        eprintln!("[TRACE] {line}");
    }
}
