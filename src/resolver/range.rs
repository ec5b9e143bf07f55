use crate::error::{PlanError, Result};
use semver::{Version, VersionReq};

/// A parsed npm-style range: one or more `||`-separated alternatives, any
/// of which may satisfy a version.
///
/// npm range syntax is wider than what [`VersionReq`] accepts, so each
/// alternative is canonicalized first: x-ranges, hyphen ranges, bare
/// major/minor forms and space-separated comparator sets all rewrite to
/// comma-joined comparators.
#[derive(Debug, Clone)]
pub struct RangeSet {
    raw: String,
    alternatives: Vec<VersionReq>,
}

impl RangeSet {
    pub fn parse(name: &str, range: &str) -> Result<RangeSet> {
        let mut alternatives = Vec::new();
        for part in range.split("||").map(str::trim).filter(|p| !p.is_empty()) {
            let canon = canonicalize(part);
            let req = if canon == "*" {
                VersionReq::STAR
            } else {
                VersionReq::parse(&canon)
                    .map_err(|e| PlanError::invalid_range(name, range, e))?
            };
            alternatives.push(req);
        }
        if alternatives.is_empty() {
            // "", "   ", "||" all mean anything goes.
            alternatives.push(VersionReq::STAR);
        }
        Ok(RangeSet {
            raw: range.trim().to_string(),
            alternatives,
        })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Rewrite a single `||`-free npm range expression into [`VersionReq`]
/// syntax. Unrecognized input passes through untouched and is rejected (or
/// not) by the `VersionReq` parser.
fn canonicalize(input: &str) -> String {
    let s = input.trim();
    if s.is_empty() || s == "*" || s.eq_ignore_ascii_case("latest") {
        return "*".to_string();
    }
    // A full semver version on its own means exactly that version.
    if Version::parse(s).is_ok() {
        return format!("={s}");
    }
    if let Some(expanded) = expand_hyphen_range(s) {
        return expanded;
    }
    if let Some(expanded) = expand_partial(s) {
        return expanded;
    }
    let tokens: Vec<&str> = s.split_whitespace().collect();
    if tokens.len() > 1 {
        return join_comparators(&tokens).unwrap_or_else(|| s.to_string());
    }
    s.to_string()
}

/// `"1.2.3 - 2.3.4"` means `">=1.2.3, <=2.3.4"`. The spaces around the
/// hyphen are required; without them the hyphen belongs to a pre-release.
fn expand_hyphen_range(s: &str) -> Option<String> {
    let idx = s.find(" - ")?;
    let lo = s[..idx].trim();
    let hi = s[idx + 3..].trim();
    if lo.is_empty() || hi.is_empty() {
        return None;
    }
    Some(format!(">={lo}, <={hi}"))
}

fn is_wild(part: &str) -> bool {
    part == "*" || part.eq_ignore_ascii_case("x")
}

/// Expand x-ranges (`1.x`, `1.2.x`, `1.*`) and bare major / major.minor
/// forms into explicit bounds.
fn expand_partial(s: &str) -> Option<String> {
    let parts: Vec<&str> = s.split('.').collect();
    match parts.as_slice() {
        [maj] if is_wild(maj) => Some("*".to_string()),
        [maj] => {
            let m: u64 = maj.parse().ok()?;
            Some(format!(">={m}.0.0, <{}.0.0", m + 1))
        }
        [maj, min] | [maj, min, _] if is_wild(min) => {
            let m: u64 = maj.parse().ok()?;
            Some(format!(">={m}.0.0, <{}.0.0", m + 1))
        }
        [maj, min] => {
            let m: u64 = maj.parse().ok()?;
            let n: u64 = min.parse().ok()?;
            Some(format!(">={m}.{n}.0, <{m}.{}.0", n + 1))
        }
        [maj, min, pat] if is_wild(pat) => {
            let m: u64 = maj.parse().ok()?;
            let n: u64 = min.parse().ok()?;
            Some(format!(">={m}.{n}.0, <{m}.{}.0", n + 1))
        }
        _ => None,
    }
}

/// `VersionReq` wants comma-joined comparators; npm accepts bare spaces.
/// Reattach detached operators (`">= 1.2"` → `">=1.2"`) and pin bare full
/// versions, then join. A dangling trailing operator gives up and lets the
/// caller's parser report it.
fn join_comparators(tokens: &[&str]) -> Option<String> {
    let mut comparators: Vec<String> = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let tok = tokens[i];
        if is_operator(tok) {
            let version = tokens.get(i + 1)?;
            comparators.push(format!("{tok}{version}"));
            i += 2;
        } else if Version::parse(tok).is_ok() {
            comparators.push(format!("={tok}"));
            i += 1;
        } else {
            comparators.push(tok.to_string());
            i += 1;
        }
    }
    Some(comparators.join(", "))
}

fn is_operator(tok: &str) -> bool {
    matches!(tok, ">" | "<" | ">=" | "<=" | "=" | "^" | "~")
}
