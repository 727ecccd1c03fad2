//! List requests parsed from command arguments

use crate::error::ListingError;
use query::PageArg;

/// Which plots to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListKind {
    Mine,
    Shared,
    World,
    Area,
    All,
    Done,
    Top,
    ForSale,
    Unowned,
    Expired,
    Fuzzy(String),
    /// A world name if one is known, otherwise a player name or identity
    Named(String),
}

impl ListKind {
    /// Options shown when no kind was given
    pub fn argument_list(economy_enabled: bool) -> Vec<&'static str> {
        let mut args = Vec::new();
        if economy_enabled {
            args.push("forsale");
        }
        args.extend([
            "mine",
            "shared",
            "world",
            "top",
            "all",
            "unowned",
            "<player>",
            "<world>",
            "done",
            "expired",
            "fuzzy <search...>",
        ]);
        args
    }

    /// Sub-commands, world names and, for a non-empty `prefix`, player
    /// names starting with `prefix` (case-insensitive)
    pub fn completions(prefix: &str, worlds: &[String], players: &[String], economy_enabled: bool) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::new();
        if economy_enabled {
            candidates.push("forsale".to_string());
        }
        candidates.push("mine".to_string());
        candidates.push("shared".to_string());
        candidates.extend(worlds.iter().cloned());
        for fixed in ["top", "all", "unowned", "done", "expired"] {
            candidates.push(fixed.to_string());
        }
        if !prefix.is_empty() {
            for player in players {
                if !candidates.iter().any(|c| c.eq_ignore_ascii_case(player)) {
                    candidates.push(player.clone());
                }
            }
        }

        let prefix = prefix.to_lowercase();
        candidates
            .into_iter()
            .filter(|c| c.to_lowercase().starts_with(&prefix))
            .collect()
    }

    fn parse(first: &str, term: Option<String>) -> Self {
        match first.to_lowercase().as_str() {
            "mine" => ListKind::Mine,
            "shared" => ListKind::Shared,
            "world" => ListKind::World,
            "area" => ListKind::Area,
            "all" => ListKind::All,
            "done" => ListKind::Done,
            "top" => ListKind::Top,
            "forsale" => ListKind::ForSale,
            "unowned" => ListKind::Unowned,
            "expired" => ListKind::Expired,
            "fuzzy" => ListKind::Fuzzy(term.unwrap_or_default()),
            _ => ListKind::Named(first.to_string()),
        }
    }
}

/// A parsed `list` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub kind: ListKind,
    pub page: PageArg,
}

impl ListRequest {
    pub fn new(kind: ListKind) -> Self {
        Self {
            kind,
            page: PageArg::default(),
        }
    }

    pub fn with_page(mut self, page: PageArg) -> Self {
        self.page = page;
        self
    }

    /// Parse `<kind> [args...] [page]`.
    ///
    /// With more than one argument the last one is read as a 1-based page
    /// number. For `fuzzy` the search term is everything between the kind and
    /// a trailing page number. `economy_enabled` only shapes the usage message.
    pub fn from_args<S: AsRef<str>>(args: &[S], economy_enabled: bool) -> Result<Self, ListingError> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        let Some(first) = args.first() else {
            return Err(ListingError::Usage(format!(
                "Available options: {}",
                ListKind::argument_list(economy_enabled).join(", ")
            )));
        };

        let page = match args.last() {
            Some(last) if args.len() > 1 => PageArg::parse(last),
            _ => PageArg::default(),
        };

        let term = if first.eq_ignore_ascii_case("fuzzy") {
            let needed = if page.is_given() { 3 } else { 2 };
            if args.len() < needed {
                return Err(ListingError::Usage("list fuzzy <search...> [#]".to_string()));
            }
            let end = if page.is_given() { args.len() - 1 } else { args.len() };
            Some(args[1..end].join(" "))
        } else {
            None
        };

        Ok(Self {
            kind: ListKind::parse(first, term),
            page,
        })
    }
}
