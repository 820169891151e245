//! Links ES modules into one browser script.
//!
//! Each module becomes a factory registered under its id. Top-level `import`
//! lines turn into `__folioRequire` calls and `export` lines into assignments
//! on the factory's `exports` object, so the script runs without an import
//! map or a module server. Only line-level module syntax is understood, which
//! covers the entries, the synthetic modules and the client runtime.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::BundleError;

static IMPORT_FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^import\s+(.+?)\s+from\s+"([^"]+)";?\s*$"#).expect("valid import regex")
});

static IMPORT_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^import\s+"([^"]+)";?\s*$"#).expect("valid import regex"));

static EXPORT_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^export\s+(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=(.*)$")
        .expect("valid export regex")
});

static EXPORT_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^export\s+(function\s+([A-Za-z_$][\w$]*).*)$").expect("valid export regex")
});

/// Module registry shared by every factory in the script.
const PRELUDE: &str = "\
const __folioModules = new Map();
function __folioDefine(id, factory) {
  __folioModules.set(id, { factory, exports: null });
}
function __folioRequire(id) {
  const module = __folioModules.get(id);
  if (!module) {
    throw new Error(\"unresolved module \" + id);
  }
  if (!module.exports) {
    module.exports = {};
    module.factory(module.exports);
  }
  return module.exports;
}
";

/// Id used for the entry in diagnostics.
const ENTRY_ID: &str = "<entry>";

/// Module source addressable by id.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Module<'a> {
    pub(crate) id: &'a str,
    pub(crate) source: &'a str,
}

/// Import specifiers of `source`, in order.
pub(crate) fn imports(source: &str) -> Vec<&str> {
    scan_lines(source)
        .into_iter()
        .filter(|(_, in_code)| *in_code)
        .filter_map(|(line, _)| {
            IMPORT_FROM
                .captures(line)
                .and_then(|caps| caps.get(2))
                .or_else(|| IMPORT_BARE.captures(line).and_then(|caps| caps.get(1)))
                .map(|m| m.as_str())
        })
        .collect()
}

/// Link `modules` and the `entry` that imports them into one script.
///
/// Modules are defined in the given order and evaluated lazily on first
/// import; the entry runs last.
pub(crate) fn link(entry: &str, modules: &[Module<'_>]) -> Result<String, BundleError> {
    let mut script = String::from(PRELUDE);
    for module in modules {
        script.push_str(&format!("__folioDefine({}, function (exports) {{\n", quote(module.id)));
        script.push_str(&rewrite(module.id, module.source)?);
        script.push_str("});\n");
    }
    script.push_str("(function () {\n");
    script.push_str(&rewrite(ENTRY_ID, entry)?);
    script.push_str("})();\n");
    Ok(script)
}

/// Rewrite module syntax on every line that starts outside a template literal.
fn rewrite(id: &str, source: &str) -> Result<String, BundleError> {
    let mut out = String::with_capacity(source.len());
    for (line, in_code) in scan_lines(source) {
        if in_code {
            out.push_str(&rewrite_line(id, line)?);
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    Ok(out)
}

fn rewrite_line(id: &str, line: &str) -> Result<String, BundleError> {
    if let Some(caps) = IMPORT_FROM.captures(line) {
        let pattern = import_pattern(&caps[1]).ok_or_else(|| unsupported(id, line))?;
        return Ok(format!("const {pattern} = __folioRequire({});", quote(&caps[2])));
    }
    if let Some(caps) = IMPORT_BARE.captures(line) {
        return Ok(format!("__folioRequire({});", quote(&caps[1])));
    }
    if let Some(rest) = line.strip_prefix("export default ") {
        return Ok(format!("exports.default = {rest}"));
    }
    if let Some(caps) = EXPORT_BINDING.captures(line) {
        let name = &caps[1];
        return Ok(format!("const {name} = exports.{name} ={}", &caps[2]));
    }
    if let Some(caps) = EXPORT_FUNCTION.captures(line) {
        // Declarations are hoisted, so the assignment may come first
        return Ok(format!("exports.{name} = {name};\n{}", &caps[1], name = &caps[2]));
    }
    if line.starts_with("import ") || line.starts_with("export ") {
        return Err(unsupported(id, line));
    }
    Ok(line.to_owned())
}

/// Destructuring pattern for an import clause.
///
/// `a, { b, c as d }` becomes `{ default: a, b, c: d }`; `* as ns` becomes
/// `ns`.
fn import_pattern(clause: &str) -> Option<String> {
    let clause = clause.trim();
    if let Some(name) = clause.strip_prefix("* as ") {
        let name = name.trim();
        return is_ident(name).then(|| name.to_owned());
    }

    let (default, named) = match clause.find('{') {
        Some(open) => {
            let inner = clause[open + 1..].strip_suffix('}')?;
            (clause[..open].trim().trim_end_matches(',').trim(), Some(inner))
        }
        None => (clause, None),
    };

    let mut parts = Vec::new();
    if !default.is_empty() {
        if !is_ident(default) {
            return None;
        }
        parts.push(format!("default: {default}"));
    }
    for spec in named.into_iter().flat_map(|names| names.split(',')) {
        let spec = spec.trim();
        if spec.is_empty() {
            continue;
        }
        let (name, alias) = spec.split_once(" as ").unwrap_or((spec, spec));
        let (name, alias) = (name.trim(), alias.trim());
        if !is_ident(name) || !is_ident(alias) {
            return None;
        }
        if name == alias {
            parts.push(name.to_owned());
        } else {
            parts.push(format!("{name}: {alias}"));
        }
    }

    (!parts.is_empty()).then(|| format!("{{ {} }}", parts.join(", ")))
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Split `source` into lines, flagging those that start outside a template
/// literal. Diagram sources and markdown travel inside template literals and
/// may contain lines that look like module syntax.
fn scan_lines(source: &str) -> Vec<(&str, bool)> {
    let mut in_template = false;
    source
        .lines()
        .map(|line| {
            let starts_in_code = !in_template;
            in_template = ends_in_template(line, in_template);
            (line, starts_in_code)
        })
        .collect()
}

fn ends_in_template(line: &str, mut in_template: bool) -> bool {
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            chars.next();
            continue;
        }
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None if in_template => {
                if c == '`' {
                    in_template = false;
                }
            }
            None => match c {
                '`' => in_template = true,
                '"' | '\'' => quote = Some(c),
                '/' if chars.peek() == Some(&'/') => break,
                _ => {}
            },
        }
    }
    in_template
}

fn unsupported(id: &str, line: &str) -> BundleError {
    BundleError::InvalidModule {
        id: id.to_owned(),
        message: format!("unsupported module syntax: {}", line.trim()),
    }
}

/// JSON-style double-quoted string literal.
pub(crate) fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
