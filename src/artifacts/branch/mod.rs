//! Branch and reference names

pub mod branch_name;

/// Pattern matching every refname shape that is not allowed: leading
/// dots or slashes, dot-after-slash, consecutive dots, trailing slashes
/// or `.lock`, reflog-style `@{`, control characters and the special
/// characters that carry meaning in revision syntax.
pub(crate) const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|/\.|\.\.|^/|/$|\.lock$|@\{|[\x00-\x20*:?\[\\^~\x7f]";
