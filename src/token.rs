//! The morphology-aware tokenizer: converts one source line into a
//! sequence of typed tokens, using the set of currently declared
//! variables and the declension table as context.

use crate::declension::{Case, DeclensionTable};
use crate::error::RuntimeError;
use crate::roman;

/// One lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Keyword(String),
    /// A nominative (or otherwise non-genitive) reference to a name.
    Variable(String),
    /// The identifier appeared in genitive case — field access.
    Genitive(String),
    Number(i64),
    Str(String),
}

/// The fixed keyword set, excluding `NIHIL`, which is its own rule
/// (a numeric literal) rather than a keyword.
const KEYWORDS: &[&str] = &[
    "SIT",
    "EST",
    "SCRIBE",
    "AVDI",
    "NOTA",
    "LEGO",
    "SI",
    "ALITER",
    "DUM",
    "FAC",
    "REDDO",
    "IACE",
    "CAPE",
    "FINIS",
    "VOCA",
    "ADDE",
    "DEME",
    "MVLTIPLICA",
    "DVCE",
    "IVNGE",
    "INCIPITCVM",
    "FINITVRCVM",
    "CONTINET",
    "INDICEDE",
    "AEQUAT",
    "MAIVS",
    "MINOR",
];

/// Context the tokenizer needs beyond the line itself: which names are
/// currently declared (in declaration order, for the longest-match
/// tie-break), the full declension table, and the names currently known
/// as function names / installed exception handlers (both are valid
/// bare-name resolution targets).
pub struct TokenizerContext<'a> {
    pub declared_order: &'a [String],
    pub declensions: &'a DeclensionTable,
    pub function_names: &'a [String],
    pub exception_names: &'a [String],
}

/// Which grammar position the scanner is currently in. Set whenever a
/// keyword with a bare-name operand is matched; consumed by the next
/// (or, for `FAC`, every remaining) name token on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BareMode {
    None,
    /// One upcoming name resolves against the unified bare-name rule.
    Name,
    /// Every remaining token on the line is a bare name (`FAC`'s header).
    Rest,
    /// One upcoming name resolves against function names only (`VOCA`).
    FunctionName,
}

fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn match_keyword(rest: &str) -> Option<&'static str> {
    KEYWORDS
        .iter()
        .copied()
        .filter(|kw| rest.starts_with(kw))
        .max_by_key(|kw| kw.len())
}

fn starts_with_any_keyword(s: &str) -> bool {
    KEYWORDS.iter().any(|kw| s.starts_with(kw))
}

/// Longest match among every form of every currently declared variable
/// *or* any nominative the declension table already knows (built-in, or
/// auto-registered by an earlier `SIT`) — a noun like `NOMEN` is a valid
/// record-field name the moment the table exists, whether or not a
/// program ever declares it as a variable — plus the keyword-adjacency
/// heuristic below.
fn match_declared_identifier(rest: &str, ctx: &TokenizerContext) -> Option<(Token, usize)> {
    let mut best_len = 0usize;
    let mut best_nom: Option<&str> = None;
    let mut best_is_genitive = false;

    for nom in ctx.declared_order.iter().chain(ctx.declensions.nominatives()) {
        if rest.starts_with(nom.as_str()) && nom.len() > best_len {
            best_len = nom.len();
            best_nom = Some(nom);
            best_is_genitive = false;
        }
        if let Some(entry) = ctx.declensions.entry(nom) {
            for (case, form) in entry.forms() {
                if rest.starts_with(form) && form.len() > best_len {
                    best_len = form.len();
                    best_nom = Some(nom);
                    best_is_genitive = case == Case::Genitive;
                }
            }
        }
    }

    let nom = best_nom?;
    let nom_len = nom.len();
    let mut len = best_len;
    let mut is_genitive = best_is_genitive;

    // Keyword-adjacency heuristic: a longer declined-form match is only
    // trusted if what follows it doesn't look like a keyword got eaten.
    if len > nom_len {
        let suffix_at_len = &rest[len..];
        if !starts_with_any_keyword(suffix_at_len) {
            let suffix_at_nom = &rest[nom_len..];
            if starts_with_any_keyword(suffix_at_nom) {
                len = nom_len;
                is_genitive = false;
            }
        }
    }

    let token = if is_genitive {
        Token::Genitive(nom.to_string())
    } else {
        Token::Variable(nom.to_string())
    };
    Some((token, len))
}

/// Unified bare-name resolution for `SIT`/`FAC`/`CAPE`/`IACE`/`VOCA`
/// operand positions. `function_only` restricts the candidate set to
/// defined function names, for `VOCA`'s callee.
fn resolve_bare_name(
    rest: &str,
    ctx: &TokenizerContext,
    function_only: bool,
) -> Result<(String, usize), RuntimeError> {
    // The maximal run of uppercase letters is the whole identifier a bare
    // name position can ever mean. A known name is only reused when it
    // accounts for that entire run — otherwise a short name that happens
    // to be a textual prefix of a longer new one (e.g. built-in `RES`
    // inside a fresh `RESULTAT`) would wrongly truncate it.
    let greedy_run: String = rest.chars().take_while(|c| c.is_ascii_uppercase()).collect();

    let mut best_len = 0usize;
    let mut best_name = String::new();

    if function_only {
        for f in ctx.function_names {
            if rest.starts_with(f.as_str()) && f.len() > best_len {
                best_len = f.len();
                best_name = f.clone();
            }
        }
    } else {
        for nom in ctx.declared_order {
            if rest.starts_with(nom.as_str()) && nom.len() > best_len {
                best_len = nom.len();
                best_name = nom.clone();
            }
            if let Some(entry) = ctx.declensions.entry(nom) {
                for (_, form) in entry.forms() {
                    if rest.starts_with(form) && form.len() > best_len {
                        best_len = form.len();
                        best_name = nom.clone();
                    }
                }
            }
        }
        if let Some(nom) = ctx.declensions.longest_nominative_prefix(rest) {
            if nom.len() > best_len {
                best_len = nom.len();
                best_name = nom.to_string();
            }
        }
        for f in ctx.function_names {
            if rest.starts_with(f.as_str()) && f.len() > best_len {
                best_len = f.len();
                best_name = f.clone();
            }
        }
        for e in ctx.exception_names {
            if rest.starts_with(e.as_str()) && e.len() > best_len {
                best_len = e.len();
                best_name = e.clone();
            }
        }
    }

    if best_len > 0 && best_len == greedy_run.len() {
        return Ok((best_name, best_len));
    }

    // No known name exactly accounts for the whole identifier: mint it as
    // a new name instead of reusing a shorter match that would truncate it.
    if greedy_run.is_empty() {
        let word = rest.split_whitespace().next().unwrap_or(rest).to_string();
        return Err(RuntimeError::Lexical { rest: word });
    }
    let len = greedy_run.len();
    Ok((greedy_run, len))
}

/// Tokenize one source line. Strips the trailing comment and surrounding
/// whitespace first; an empty result means a blank or comment-only line.
pub fn tokenize(line: &str, ctx: &TokenizerContext) -> Result<Vec<Token>, RuntimeError> {
    let code = strip_comment(line).trim();
    if code.is_empty() {
        return Ok(Vec::new());
    }

    let mut tokens = Vec::new();
    let mut rest = code;
    let mut bare = BareMode::None;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        match bare {
            BareMode::Name | BareMode::Rest | BareMode::FunctionName => {
                let function_only = matches!(bare, BareMode::FunctionName);
                let (name, len) = resolve_bare_name(rest, ctx, function_only)?;
                tokens.push(Token::Variable(name));
                rest = &rest[len..];
                bare = if matches!(bare, BareMode::Rest) {
                    BareMode::Rest
                } else {
                    BareMode::None
                };
            }
            BareMode::None => {
                if let Some(tail) = rest.strip_prefix('"') {
                    let end = tail.find('"').ok_or(RuntimeError::UnclosedString)?;
                    tokens.push(Token::Str(tail[..end].to_string()));
                    rest = &tail[end + 1..];
                    continue;
                }

                if let Some(kw) = match_keyword(rest) {
                    tokens.push(Token::Keyword(kw.to_string()));
                    rest = &rest[kw.len()..];
                    bare = match kw {
                        "SIT" | "CAPE" | "IACE" => BareMode::Name,
                        "FAC" => BareMode::Rest,
                        "VOCA" => BareMode::FunctionName,
                        _ => BareMode::None,
                    };
                    continue;
                }

                if rest.starts_with(roman::NIHIL) {
                    tokens.push(Token::Number(0));
                    rest = &rest[roman::NIHIL.len()..];
                    continue;
                }

                if let Some((token, len)) = match_declared_identifier(rest, ctx) {
                    tokens.push(token);
                    rest = &rest[len..];
                    continue;
                }

                let run = roman::scan_numeral_run(rest);
                if !run.is_empty() {
                    if let Some(n) = roman::parse(run) {
                        tokens.push(Token::Number(n));
                        rest = &rest[run.len()..];
                        continue;
                    }
                }

                let word = rest.split_whitespace().next().unwrap_or(rest).to_string();
                return Err(RuntimeError::Lexical { rest: word });
            }
        }
    }

    Ok(tokens)
}
