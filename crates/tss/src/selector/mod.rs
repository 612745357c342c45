//! Compiled selectors.
//!
//! Parsed selector text is compiled into [`SelectorNode`]s stored in a
//! per-sheet [`SelectorArena`] and addressed by [`SelectorId`]. A node is one
//! compound unit (`Button.primary:hover`); its [`Link`] points at the
//! compound(s) to its left together with the combinator joining them, so a
//! whole chain is identified by the id of its rightmost node.
//!
//! `&` inside a nested block compiles to an [`Combinator::Enclosing`] link
//! whose targets are the enclosing block's own selectors, and a nested
//! selector without `&` links to them as a descendant.

pub mod matcher;

use std::fmt::Write as _;
use std::ops::{Add, Index};

use bitflags::bitflags;
use phf::phf_map;
use smallvec::SmallVec;

use crate::error::ParseErrorKind;
use crate::parser::selectors::{ComplexSelector, Selector, SelectorList, parse_selector_list};

pub use matcher::{StyleTarget, matched_specificity, matches, matches_any};

bitflags! {
    /// Pseudo-class bits.
    ///
    /// The low byte holds element states reported by the tree through
    /// [`StyleTarget::pseudo_classes`]; bits may co-occur (an element can
    /// be hovered and active at once). The high byte holds structural
    /// pseudo-classes, which the matcher derives from the tree itself.
    ///
    /// # Example
    ///
    /// ```
    /// use tss::selector::PseudoClasses;
    ///
    /// let states = PseudoClasses::HOVER | PseudoClasses::ACTIVE;
    /// assert!(states.contains(PseudoClasses::HOVER));
    /// assert!(!states.contains(PseudoClasses::FOCUS));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PseudoClasses: u16 {
        /// Pointer is over the element
        const HOVER       = 1 << 0;
        /// Element is being pressed
        const ACTIVE      = 1 << 1;
        /// Element has keyboard focus
        const FOCUS       = 1 << 2;
        /// Element is not interactive
        const DISABLED    = 1 << 3;
        /// Element is playing its appear transition
        const INTRO       = 1 << 4;
        /// Element is playing its disappear transition
        const OUTRO       = 1 << 5;
        /// Element is a leading decoration of its parent
        const BEFORE      = 1 << 6;
        /// Element is a trailing decoration of its parent
        const AFTER       = 1 << 7;

        const EMPTY       = 1 << 8;
        const FIRST_CHILD = 1 << 9;
        const LAST_CHILD  = 1 << 10;
        const ONLY_CHILD  = 1 << 11;

        const STATE = Self::HOVER.bits() | Self::ACTIVE.bits() | Self::FOCUS.bits()
            | Self::DISABLED.bits() | Self::INTRO.bits() | Self::OUTRO.bits()
            | Self::BEFORE.bits() | Self::AFTER.bits();
        const STRUCTURAL = Self::EMPTY.bits() | Self::FIRST_CHILD.bits()
            | Self::LAST_CHILD.bits() | Self::ONLY_CHILD.bits();
    }
}

/// How a pseudo-class name compiles.
#[derive(Debug, Clone, Copy)]
enum PseudoKind {
    Flag(PseudoClasses),
    NthChild,
    Has,
    Not,
}

static PSEUDO_CLASS_NAMES: phf::Map<&'static str, PseudoKind> = phf_map! {
    "hover" => PseudoKind::Flag(PseudoClasses::HOVER),
    "active" => PseudoKind::Flag(PseudoClasses::ACTIVE),
    "focus" => PseudoKind::Flag(PseudoClasses::FOCUS),
    "disabled" => PseudoKind::Flag(PseudoClasses::DISABLED),
    "intro" => PseudoKind::Flag(PseudoClasses::INTRO),
    "outro" => PseudoKind::Flag(PseudoClasses::OUTRO),
    "before" => PseudoKind::Flag(PseudoClasses::BEFORE),
    "after" => PseudoKind::Flag(PseudoClasses::AFTER),
    "empty" => PseudoKind::Flag(PseudoClasses::EMPTY),
    "first-child" => PseudoKind::Flag(PseudoClasses::FIRST_CHILD),
    "last-child" => PseudoKind::Flag(PseudoClasses::LAST_CHILD),
    "only-child" => PseudoKind::Flag(PseudoClasses::ONLY_CHILD),
    "nth-child" => PseudoKind::NthChild,
    "has" => PseudoKind::Has,
    "not" => PseudoKind::Not,
};

impl PseudoClasses {
    /// Looks up a single flag by its selector name (`"hover"`, `"first-child"`).
    ///
    /// Names are case-insensitive; `nth-child`, `has` and `not` take an
    /// argument and have no flag.
    pub fn from_selector_name(name: &str) -> Option<Self> {
        match PSEUDO_CLASS_NAMES.get(name.to_ascii_lowercase().as_str()) {
            Some(PseudoKind::Flag(flag)) => Some(*flag),
            _ => None,
        }
    }

    fn canonical_names(self) -> impl Iterator<Item = &'static str> {
        const ORDER: [(PseudoClasses, &str); 12] = [
            (PseudoClasses::HOVER, "hover"),
            (PseudoClasses::ACTIVE, "active"),
            (PseudoClasses::FOCUS, "focus"),
            (PseudoClasses::DISABLED, "disabled"),
            (PseudoClasses::INTRO, "intro"),
            (PseudoClasses::OUTRO, "outro"),
            (PseudoClasses::BEFORE, "before"),
            (PseudoClasses::AFTER, "after"),
            (PseudoClasses::EMPTY, "empty"),
            (PseudoClasses::FIRST_CHILD, "first-child"),
            (PseudoClasses::LAST_CHILD, "last-child"),
            (PseudoClasses::ONLY_CHILD, "only-child"),
        ];
        ORDER
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

/// `:nth-child()` argument. Positions are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NthChild {
    Index(usize),
    Odd,
    Even,
}

impl NthChild {
    pub fn parse(argument: &str) -> Option<Self> {
        let argument = argument.trim();
        if argument.eq_ignore_ascii_case("odd") {
            return Some(Self::Odd);
        }
        if argument.eq_ignore_ascii_case("even") {
            return Some(Self::Even);
        }
        argument
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
            .map(Self::Index)
    }

    /// Tests a 1-based position.
    pub fn matches(self, position: usize) -> bool {
        match self {
            Self::Index(n) => position == n,
            Self::Odd => position % 2 == 1,
            Self::Even => position % 2 == 0,
        }
    }

    fn canonical(self) -> String {
        match self {
            Self::Index(n) => n.to_string(),
            Self::Odd => "odd".to_string(),
            Self::Even => "even".to_string(),
        }
    }
}

/// How a compound relates to the compound(s) it links to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: some ancestor matches.
    Descendant,
    /// `>`: the parent matches.
    Child,
    /// `&`: the same element matches one of the enclosing block's selectors.
    Enclosing,
    /// `+`: the immediately preceding sibling matches.
    AdjacentSibling,
    /// `~`: some preceding sibling matches.
    GeneralSibling,
}

impl Combinator {
    fn symbol(self) -> &'static str {
        match self {
            Self::Descendant => " ",
            Self::Child => " > ",
            Self::Enclosing => "",
            Self::AdjacentSibling => " + ",
            Self::GeneralSibling => " ~ ",
        }
    }
}

/// CSS specificity for determining rule precedence.
///
/// Ordered lexicographically: ids, then classes and pseudo-classes, then
/// element names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity {
    pub ids: u32,
    pub classes: u32,
    pub types: u32,
}

impl Specificity {
    pub const fn new(ids: u32, classes: u32, types: u32) -> Self {
        Self {
            ids,
            classes,
            types,
        }
    }
}

impl Add for Specificity {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            ids: self.ids + other.ids,
            classes: self.classes + other.classes,
            types: self.types + other.types,
        }
    }
}

/// A link from a compound to the compound(s) on its left.
///
/// With several targets the link is satisfied if any of them matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub combinator: Combinator,
    pub targets: SmallVec<[SelectorId; 1]>,
}

/// One argument of `:has()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HasArgument {
    pub selector: SelectorId,
    /// `:has(> x)` only looks at direct children.
    pub child_only: bool,
}

/// Index of a [`SelectorNode`] in its sheet's [`SelectorArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorId(u32);

impl SelectorId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One compiled compound unit and its link to the rest of the chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectorNode {
    /// Lowercased element name; `None` matches any element.
    pub element: Option<String>,
    pub id: Option<String>,
    /// All of these classes are required.
    pub classes: SmallVec<[String; 2]>,
    pub pseudo: PseudoClasses,
    pub nth_child: Option<NthChild>,
    pub has: Vec<HasArgument>,
    pub not: Vec<SelectorId>,
    pub link: Option<Link>,
    /// Specificity of this compound alone.
    pub compound_specificity: Specificity,
    /// Highest specificity of the chain ending at this node. Exact unless
    /// `uniform` is false, in which case [`matched_specificity`] gives the
    /// specificity of the path an element actually matched.
    pub specificity: Specificity,
    /// `false` if some link along the chain has several targets.
    pub uniform: bool,
    /// Canonical text of the chain ending at this node.
    pub canonical: String,
}

impl SelectorNode {
    fn own_specificity(&self) -> Specificity {
        let pseudo = self.pseudo.bits().count_ones()
            + u32::from(self.nth_child.is_some())
            + self.has.len() as u32
            + self.not.len() as u32;
        Specificity::new(
            u32::from(self.id.is_some()),
            self.classes.len() as u32 + pseudo,
            u32::from(self.element.is_some()),
        )
    }

    /// Text of this compound's own filters.
    fn filter_text(&self, arena: &SelectorArena) -> String {
        let mut text = String::new();
        if let Some(element) = &self.element {
            text.push_str(element);
        }
        if let Some(id) = &self.id {
            let _ = write!(text, "#{id}");
        }
        for class in &self.classes {
            let _ = write!(text, ".{class}");
        }
        for name in self.pseudo.canonical_names() {
            let _ = write!(text, ":{name}");
        }
        if let Some(nth) = self.nth_child {
            let _ = write!(text, ":nth-child({})", nth.canonical());
        }
        for has in &self.has {
            let prefix = if has.child_only { "> " } else { "" };
            let _ = write!(text, ":has({prefix}{})", arena[has.selector].canonical);
        }
        for not in &self.not {
            let _ = write!(text, ":not({})", arena[*not].canonical);
        }
        text
    }
}

/// Storage for the compiled selectors of one stylesheet.
#[derive(Clone, Debug, Default)]
pub struct SelectorArena {
    nodes: Vec<SelectorNode>,
}

impl Index<SelectorId> for SelectorArena {
    type Output = SelectorNode;

    fn index(&self, id: SelectorId) -> &SelectorNode {
        &self.nodes[id.index()]
    }
}

impl SelectorArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: SelectorId) -> Option<&SelectorNode> {
        self.nodes.get(id.index())
    }

    /// Highest specificity among `ids`.
    pub fn max_specificity(&self, ids: &[SelectorId]) -> Specificity {
        ids.iter()
            .map(|id| self[*id].specificity)
            .max()
            .unwrap_or_default()
    }

    /// Canonical text of a group list, joined with `", "`.
    pub fn list_text(&self, ids: &[SelectorId]) -> String {
        ids.iter()
            .map(|id| self[*id].canonical.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Stores a node, computing its specificity and canonical text from
    /// the nodes it links to.
    fn push(&mut self, mut node: SelectorNode) -> SelectorId {
        node.compound_specificity = node.own_specificity();
        node.specificity = node.compound_specificity;
        node.uniform = true;
        if let Some(link) = &node.link {
            node.specificity = node.specificity + self.max_specificity(&link.targets);
            node.uniform = link.targets.len() == 1 && link.targets.iter().all(|t| self[*t].uniform);
        }

        let filters = node.filter_text(self);
        node.canonical = match &node.link {
            None if filters.is_empty() => "*".to_string(),
            None => filters,
            Some(link) => {
                let left = match link.targets.as_slice() {
                    [single] => self[*single].canonical.clone(),
                    many => format!(":is({})", self.list_text(many)),
                };
                match link.combinator {
                    Combinator::Enclosing => format!("{left}{filters}"),
                    other => {
                        let filters = if filters.is_empty() { "*".to_string() } else { filters };
                        format!("{left}{}{filters}", other.symbol())
                    }
                }
            }
        };

        let id = SelectorId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Compiles a parsed selector list into the arena.
    ///
    /// `enclosing` holds the enclosing block's selectors when the list
    /// belongs to a nested block. Returns one id per comma-separated group.
    pub fn compile(
        &mut self,
        list: &SelectorList,
        enclosing: Option<&[SelectorId]>,
    ) -> Result<Vec<SelectorId>, ParseErrorKind> {
        list.selectors
            .iter()
            .map(|complex| self.compile_complex(complex, enclosing))
            .collect()
    }

    fn compile_complex(
        &mut self,
        complex: &ComplexSelector,
        enclosing: Option<&[SelectorId]>,
    ) -> Result<SelectorId, ParseErrorKind> {
        let mut previous: Option<(SelectorId, Combinator)> = None;

        for part in &complex.parts {
            let mut node = self.compile_compound(&part.compound.selectors)?;
            let has_parent_ref = part
                .compound
                .selectors
                .iter()
                .any(|s| matches!(s, Selector::Parent));

            node.link = match (previous, has_parent_ref, enclosing) {
                (Some(_), true, _) => {
                    return Err(malformed(complex, "`&` must start a selector"));
                }
                (None, true, None) => {
                    return Err(malformed(complex, "`&` used outside a nested block"));
                }
                (None, true, Some(parents)) => Some(Link {
                    combinator: Combinator::Enclosing,
                    targets: parents.iter().copied().collect(),
                }),
                (None, false, Some(parents)) => Some(Link {
                    combinator: Combinator::Descendant,
                    targets: parents.iter().copied().collect(),
                }),
                (None, false, None) => None,
                (Some((left, combinator)), false, _) => Some(Link {
                    combinator,
                    targets: SmallVec::from_elem(left, 1),
                }),
            };

            let id = self.push(node);
            previous = Some((id, part.combinator.unwrap_or(Combinator::Descendant)));
        }

        previous
            .map(|(id, _)| id)
            .ok_or_else(|| malformed(complex, "empty selector"))
    }

    fn compile_compound(&mut self, selectors: &[Selector]) -> Result<SelectorNode, ParseErrorKind> {
        let mut node = SelectorNode::default();

        for simple in selectors {
            match simple {
                Selector::Type(name) => node.element = Some(name.to_ascii_lowercase()),
                Selector::Universal | Selector::Parent => {}
                Selector::Class(class) => {
                    if !node.classes.contains(class) {
                        node.classes.push(class.clone());
                    }
                }
                Selector::Id(id) => node.id = Some(id.clone()),
                Selector::PseudoClass { name, argument } => {
                    self.compile_pseudo(&mut node, name, argument.as_deref())?;
                }
            }
        }

        Ok(node)
    }

    fn compile_pseudo(
        &mut self,
        node: &mut SelectorNode,
        name: &str,
        argument: Option<&str>,
    ) -> Result<(), ParseErrorKind> {
        let lower = name.to_ascii_lowercase();
        let kind = PSEUDO_CLASS_NAMES
            .get(lower.as_str())
            .copied()
            .ok_or_else(|| ParseErrorKind::UnknownPseudoClass(name.to_string()))?;

        let malformed_pseudo = |reason: &str| ParseErrorKind::MalformedSelector {
            selector: format!(":{name}({})", argument.unwrap_or_default()),
            reason: reason.to_string(),
        };

        match (kind, argument) {
            (PseudoKind::Flag(flag), None) => node.pseudo |= flag,
            (PseudoKind::Flag(_), Some(_)) => {
                return Err(malformed_pseudo("pseudo-class takes no argument"));
            }
            (PseudoKind::NthChild, Some(arg)) => {
                let nth = NthChild::parse(arg)
                    .ok_or_else(|| malformed_pseudo("expected a position, `odd` or `even`"))?;
                node.nth_child = Some(nth);
            }
            (PseudoKind::Has, Some(arg)) => {
                for member in split_top_level(arg) {
                    let (member, child_only) = match member.trim_start().strip_prefix('>') {
                        Some(rest) => (rest, true),
                        None => (member, false),
                    };
                    for selector in self.compile_argument(member)? {
                        node.has.push(HasArgument {
                            selector,
                            child_only,
                        });
                    }
                }
            }
            (PseudoKind::Not, Some(arg)) => {
                let selectors = self.compile_argument(arg)?;
                node.not.extend(selectors);
            }
            (_, None) => return Err(malformed_pseudo("missing argument")),
        }
        Ok(())
    }

    /// Compiles the selector list inside `:has()` / `:not()`.
    fn compile_argument(&mut self, argument: &str) -> Result<Vec<SelectorId>, ParseErrorKind> {
        let trimmed = argument.trim();
        match parse_selector_list(trimmed) {
            Ok((rest, list)) if rest.trim().is_empty() => self.compile(&list, None),
            _ => Err(ParseErrorKind::MalformedSelector {
                selector: trimmed.to_string(),
                reason: "invalid selector argument".to_string(),
            }),
        }
    }
}

/// Splits a pseudo-class argument on commas outside parentheses.
fn split_top_level(argument: &str) -> impl Iterator<Item = &str> {
    let mut depth = 0usize;
    let mut start = 0;
    let mut pieces = Vec::new();
    for (offset, c) in argument.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push(&argument[start..offset]);
                start = offset + 1;
            }
            _ => {}
        }
    }
    pieces.push(&argument[start..]);
    pieces.into_iter()
}

fn malformed(complex: &ComplexSelector, reason: &str) -> ParseErrorKind {
    ParseErrorKind::MalformedSelector {
        selector: complex.to_string(),
        reason: reason.to_string(),
    }
}

/// Parses and compiles a stand-alone selector list into `arena`.
///
/// Useful for queries and tests; nested-block selectors go through the
/// stylesheet parser instead.
pub fn compile_selector(
    arena: &mut SelectorArena,
    text: &str,
) -> Result<Vec<SelectorId>, ParseErrorKind> {
    arena.compile_argument(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(text: &str) -> (SelectorArena, Vec<SelectorId>) {
        let mut arena = SelectorArena::new();
        let ids = compile_selector(&mut arena, text).unwrap();
        (arena, ids)
    }

    #[test]
    fn test_specificity_counts() {
        let (arena, ids) = compile("Container > Button.primary#submit:hover");
        assert_eq!(arena[ids[0]].specificity, Specificity::new(1, 2, 2));
    }

    #[test]
    fn test_id_outranks_any_number_of_classes() {
        let (arena, ids) = compile("#a, .b.c.d.e");
        assert!(arena[ids[0]].specificity > arena[ids[1]].specificity);
    }

    #[test]
    fn test_structural_pseudo_counts_as_class() {
        let (arena, ids) = compile("li:nth-child(odd):not(.x)");
        assert_eq!(arena[ids[0]].specificity, Specificity::new(0, 2, 1));
    }

    #[test]
    fn test_element_names_are_lowercased() {
        let (arena, ids) = compile("BUTTON");
        assert_eq!(arena[ids[0]].element.as_deref(), Some("button"));
    }

    #[test]
    fn test_unknown_pseudo_class_is_rejected() {
        let mut arena = SelectorArena::new();
        let err = compile_selector(&mut arena, "Button:wiggle").unwrap_err();
        assert!(matches!(err, ParseErrorKind::UnknownPseudoClass(name) if name == "wiggle"));
    }

    #[test]
    fn test_parent_reference_requires_enclosing_block() {
        let mut arena = SelectorArena::new();
        assert!(compile_selector(&mut arena, "&:hover").is_err());
    }

    #[test]
    fn test_pseudo_flag_lookup_by_selector_name() {
        assert_eq!(PseudoClasses::from_selector_name("hover"), Some(PseudoClasses::HOVER));
        assert_eq!(
            PseudoClasses::from_selector_name("First-Child"),
            Some(PseudoClasses::FIRST_CHILD)
        );
        assert_eq!(PseudoClasses::from_selector_name("nth-child"), None);
        assert_eq!(PseudoClasses::from_selector_name("wiggle"), None);
    }

    #[test]
    fn test_has_child_prefix_is_read_per_argument() {
        let (arena, ids) = compile("Panel:has(> .a, > .b)");
        let has = &arena[ids[0]].has;
        assert_eq!(has.len(), 2);
        assert!(has.iter().all(|h| h.child_only));
        assert_eq!(arena[ids[0]].canonical, "panel:has(> .a):has(> .b)");

        let (arena, ids) = compile("Panel:has(> .a, .b)");
        let flags: Vec<bool> = arena[ids[0]].has.iter().map(|h| h.child_only).collect();
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn test_has_argument_split_ignores_nested_commas() {
        let (arena, ids) = compile("Panel:has(Item:not(.a, .b), .c)");
        assert_eq!(arena[ids[0]].has.len(), 2);
    }

    #[test]
    fn test_uniform_chains() {
        let (arena, ids) = compile("Screen > Button.primary");
        assert!(arena[ids[0]].uniform);
    }

    #[test]
    fn test_nth_child_parse() {
        assert_eq!(NthChild::parse("odd"), Some(NthChild::Odd));
        assert_eq!(NthChild::parse(" 3 "), Some(NthChild::Index(3)));
        assert_eq!(NthChild::parse("0"), None);
        assert_eq!(NthChild::parse("2n+1"), None);
    }
}
