//! Branch name sanitizing.

/// Normalize a branch name for use in file names and template data.
///
/// Runs of whitespace, `/` and `\` collapse to a single `-`; leading and
/// trailing separators are dropped. The mapping is lossy: `feature/login`
/// and `feature login` both become `feature-login`.
pub fn sanitize(branch: &str) -> String {
    let is_separator = |c: char| c.is_whitespace() || c == '/' || c == '\\';

    let mut result = String::with_capacity(branch.len());
    let mut pending_dash = false;

    for c in branch.trim_matches(is_separator).chars() {
        if is_separator(c) {
            pending_dash = true;
        } else {
            if pending_dash {
                result.push('-');
                pending_dash = false;
            }
            result.push(c);
        }
    }

    result
}
