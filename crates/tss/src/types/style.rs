//! Author and computed style bags.
//!
//! A [`Styles`] value is what a rule block or an element's inline style
//! declares: every property is optional. The cascade folds several of them
//! on top of each other and then [`ComputedStyle::resolve`] fills the gaps,
//! first from the parent's computed style for inheritable properties and
//! then from the initial values.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use once_cell::sync::Lazy;

use crate::parser::stylesheet::Declaration;
use crate::types::{
    AlignItems, Border, BorderEdge, Display, Edge, FlexDirection, FontStyle, FontWeight,
    JustifyContent, Overflow, Position, RgbaColor, Scalar, Spacing, TextAlign, Unit, Visibility,
};

/// Default font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;

/// The author form of a style: only declared properties are `Some`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Styles {
    // Paint
    pub color: Option<RgbaColor>,
    pub background: Option<RgbaColor>,
    pub opacity: Option<f32>,
    /// Indexed by [`Edge`] (top, right, bottom, left).
    pub border: [Option<BorderEdge>; 4],
    pub border_radius: Option<f32>,

    // Box model
    pub width: Option<Scalar>,
    pub height: Option<Scalar>,
    pub min_width: Option<Scalar>,
    pub min_height: Option<Scalar>,
    pub max_width: Option<Scalar>,
    pub max_height: Option<Scalar>,
    pub margin: [Option<Scalar>; 4],
    pub padding: [Option<Scalar>; 4],

    // Layout inputs
    pub display: Option<Display>,
    pub position: Option<Position>,
    pub flex_direction: Option<FlexDirection>,
    pub flex_grow: Option<f32>,
    pub flex_shrink: Option<f32>,
    pub justify_content: Option<JustifyContent>,
    pub align_items: Option<AlignItems>,
    pub gap: Option<Scalar>,
    pub overflow_x: Option<Overflow>,
    pub overflow_y: Option<Overflow>,

    // Text
    pub font_family: Option<String>,
    pub font_size: Option<Scalar>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub text_align: Option<TextAlign>,
    pub visibility: Option<Visibility>,

    // Animation storage
    pub animation_name: Option<String>,
    pub animation_duration: Option<f32>,
}

fn overlay<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
    if let Some(value) = src {
        *dst = Some(value.clone());
    }
}

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the author form of a declaration list, applying it in order.
    pub fn from_declarations<'a>(declarations: impl IntoIterator<Item = &'a Declaration>) -> Self {
        let mut styles = Self::default();
        for declaration in declarations {
            styles.apply(declaration);
        }
        styles
    }

    /// Returns `true` if no property is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies one declaration, overwriting whatever it addresses.
    pub fn apply(&mut self, declaration: &Declaration) {
        match declaration {
            Declaration::Color(c) => self.color = Some(*c),
            Declaration::Background(c) => self.background = Some(*c),
            Declaration::Opacity(o) => self.opacity = Some(*o),
            Declaration::Border(edge) => self.border = [Some(*edge); 4],
            Declaration::BorderEdge(side, edge) => self.border[*side as usize] = Some(*edge),
            Declaration::BorderRadius(r) => self.border_radius = Some(*r),

            Declaration::Width(s) => self.width = Some(*s),
            Declaration::Height(s) => self.height = Some(*s),
            Declaration::MinWidth(s) => self.min_width = Some(*s),
            Declaration::MinHeight(s) => self.min_height = Some(*s),
            Declaration::MaxWidth(s) => self.max_width = Some(*s),
            Declaration::MaxHeight(s) => self.max_height = Some(*s),
            Declaration::Margin(spacing) => self.margin = sides_of(spacing),
            Declaration::MarginEdge(side, s) => self.margin[*side as usize] = Some(*s),
            Declaration::Padding(spacing) => self.padding = sides_of(spacing),
            Declaration::PaddingEdge(side, s) => self.padding[*side as usize] = Some(*s),

            Declaration::Display(d) => self.display = Some(*d),
            Declaration::Position(p) => self.position = Some(*p),
            Declaration::FlexDirection(d) => self.flex_direction = Some(*d),
            Declaration::FlexGrow(g) => self.flex_grow = Some(*g),
            Declaration::FlexShrink(s) => self.flex_shrink = Some(*s),
            Declaration::JustifyContent(j) => self.justify_content = Some(*j),
            Declaration::AlignItems(a) => self.align_items = Some(*a),
            Declaration::Gap(g) => self.gap = Some(*g),
            Declaration::Overflow(o) => {
                self.overflow_x = Some(*o);
                self.overflow_y = Some(*o);
            }
            Declaration::OverflowX(o) => self.overflow_x = Some(*o),
            Declaration::OverflowY(o) => self.overflow_y = Some(*o),

            Declaration::FontFamily(f) => self.font_family = Some(f.clone()),
            Declaration::FontSize(s) => self.font_size = Some(*s),
            Declaration::FontWeight(w) => self.font_weight = Some(*w),
            Declaration::FontStyle(s) => self.font_style = Some(*s),
            Declaration::TextAlign(a) => self.text_align = Some(*a),
            Declaration::Visibility(v) => self.visibility = Some(*v),

            Declaration::AnimationName(n) => self.animation_name = Some(n.clone()),
            Declaration::AnimationDuration(d) => self.animation_duration = Some(*d),

            Declaration::Unknown { .. } => {}
        }
    }

    /// Overlays every property set in `other` on top of `self`.
    pub fn merge(&mut self, other: &Self) {
        overlay(&mut self.color, &other.color);
        overlay(&mut self.background, &other.background);
        overlay(&mut self.opacity, &other.opacity);
        overlay(&mut self.border_radius, &other.border_radius);

        overlay(&mut self.width, &other.width);
        overlay(&mut self.height, &other.height);
        overlay(&mut self.min_width, &other.min_width);
        overlay(&mut self.min_height, &other.min_height);
        overlay(&mut self.max_width, &other.max_width);
        overlay(&mut self.max_height, &other.max_height);
        for i in 0..4 {
            overlay(&mut self.border[i], &other.border[i]);
            overlay(&mut self.margin[i], &other.margin[i]);
            overlay(&mut self.padding[i], &other.padding[i]);
        }

        overlay(&mut self.display, &other.display);
        overlay(&mut self.position, &other.position);
        overlay(&mut self.flex_direction, &other.flex_direction);
        overlay(&mut self.flex_grow, &other.flex_grow);
        overlay(&mut self.flex_shrink, &other.flex_shrink);
        overlay(&mut self.justify_content, &other.justify_content);
        overlay(&mut self.align_items, &other.align_items);
        overlay(&mut self.gap, &other.gap);
        overlay(&mut self.overflow_x, &other.overflow_x);
        overlay(&mut self.overflow_y, &other.overflow_y);

        overlay(&mut self.font_family, &other.font_family);
        overlay(&mut self.font_size, &other.font_size);
        overlay(&mut self.font_weight, &other.font_weight);
        overlay(&mut self.font_style, &other.font_style);
        overlay(&mut self.text_align, &other.text_align);
        overlay(&mut self.visibility, &other.visibility);

        overlay(&mut self.animation_name, &other.animation_name);
        overlay(&mut self.animation_duration, &other.animation_duration);
    }
}

fn sides_of(spacing: &Spacing) -> [Option<Scalar>; 4] {
    [
        Some(spacing.top),
        Some(spacing.right),
        Some(spacing.bottom),
        Some(spacing.left),
    ]
}

fn spacing_from(sides: &[Option<Scalar>; 4], initial: Scalar) -> Spacing {
    let side = |edge: Edge| sides[edge as usize].unwrap_or(initial);
    Spacing {
        top: side(Edge::Top),
        right: side(Edge::Right),
        bottom: side(Edge::Bottom),
        left: side(Edge::Left),
    }
}

static INITIAL: Lazy<ComputedStyle> = Lazy::new(|| ComputedStyle {
    color: RgbaColor::black(),
    background: RgbaColor::transparent(),
    opacity: 1.0,
    border: Border::default(),
    border_radius: 0.0,
    width: Scalar::AUTO,
    height: Scalar::AUTO,
    min_width: None,
    min_height: None,
    max_width: None,
    max_height: None,
    margin: Spacing::default(),
    padding: Spacing::default(),
    display: Display::default(),
    position: Position::default(),
    flex_direction: FlexDirection::default(),
    flex_grow: 0.0,
    flex_shrink: 1.0,
    justify_content: JustifyContent::default(),
    align_items: AlignItems::default(),
    gap: Scalar::ZERO,
    overflow_x: Overflow::default(),
    overflow_y: Overflow::default(),
    font_family: "sans-serif".to_string(),
    font_size: Scalar::points(DEFAULT_FONT_SIZE),
    font_weight: FontWeight::NORMAL,
    font_style: FontStyle::default(),
    text_align: TextAlign::default(),
    visibility: Visibility::default(),
    animation_name: None,
    animation_duration: 0.0,
});

/// The fully resolved style of one element.
///
/// Box-model lengths (`width` through `gap`) are read by the layout engine,
/// paint properties (`color`, `background`, `border`, `opacity`) by the
/// renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    // Paint
    pub color: RgbaColor,
    pub background: RgbaColor,
    pub opacity: f32,
    pub border: Border,
    pub border_radius: f32,

    // Box model
    pub width: Scalar,
    pub height: Scalar,
    pub min_width: Option<Scalar>,
    pub min_height: Option<Scalar>,
    pub max_width: Option<Scalar>,
    pub max_height: Option<Scalar>,
    pub margin: Spacing,
    pub padding: Spacing,

    // Layout inputs
    pub display: Display,
    pub position: Position,
    pub flex_direction: FlexDirection,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub gap: Scalar,
    pub overflow_x: Overflow,
    pub overflow_y: Overflow,

    // Text
    pub font_family: String,
    pub font_size: Scalar,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_align: TextAlign,
    pub visibility: Visibility,

    // Animation storage
    pub animation_name: Option<String>,
    pub animation_duration: f32,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        INITIAL.clone()
    }
}

impl Eq for ComputedStyle {}

impl Hash for ComputedStyle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash_inherited(state);

        self.background.hash(state);
        self.opacity.to_bits().hash(state);
        self.border.hash(state);
        self.border_radius.to_bits().hash(state);

        self.width.hash(state);
        self.height.hash(state);
        self.min_width.hash(state);
        self.min_height.hash(state);
        self.max_width.hash(state);
        self.max_height.hash(state);
        self.margin.hash(state);
        self.padding.hash(state);

        self.display.hash(state);
        self.position.hash(state);
        self.flex_direction.hash(state);
        self.flex_grow.to_bits().hash(state);
        self.flex_shrink.to_bits().hash(state);
        self.justify_content.hash(state);
        self.align_items.hash(state);
        self.gap.hash(state);
        self.overflow_x.hash(state);
        self.overflow_y.hash(state);

        self.animation_name.hash(state);
        self.animation_duration.to_bits().hash(state);
    }
}

impl ComputedStyle {
    /// The initial values of every property.
    pub fn initial() -> &'static Self {
        &INITIAL
    }

    /// Resolves an author style against the parent's computed style.
    ///
    /// Unset inheritable properties copy the parent's value, everything
    /// else falls back to its initial value. A percentage `font-size` is
    /// taken relative to the parent's size.
    pub fn resolve(author: &Styles, parent: Option<&ComputedStyle>) -> Self {
        let initial = Self::initial();
        let inherited = parent.unwrap_or(initial);

        let font_size = match author.font_size {
            Some(Scalar {
                value,
                unit: Unit::Percent,
            }) if inherited.font_size.unit == Unit::Points => {
                Scalar::points(inherited.font_size.value * value / 100.0)
            }
            Some(size) => size,
            None => inherited.font_size,
        };

        let border_edge = |edge: Edge| author.border[edge as usize].unwrap_or(BorderEdge::NONE);

        Self {
            color: author.color.unwrap_or(inherited.color),
            background: author.background.unwrap_or(initial.background),
            opacity: author.opacity.unwrap_or(initial.opacity).clamp(0.0, 1.0),
            border: Border {
                top: border_edge(Edge::Top),
                right: border_edge(Edge::Right),
                bottom: border_edge(Edge::Bottom),
                left: border_edge(Edge::Left),
            },
            border_radius: author.border_radius.unwrap_or(initial.border_radius),

            width: author.width.unwrap_or(initial.width),
            height: author.height.unwrap_or(initial.height),
            min_width: author.min_width,
            min_height: author.min_height,
            max_width: author.max_width,
            max_height: author.max_height,
            margin: spacing_from(&author.margin, Scalar::ZERO),
            padding: spacing_from(&author.padding, Scalar::ZERO),

            display: author.display.unwrap_or(initial.display),
            position: author.position.unwrap_or(initial.position),
            flex_direction: author.flex_direction.unwrap_or(initial.flex_direction),
            flex_grow: author.flex_grow.unwrap_or(initial.flex_grow),
            flex_shrink: author.flex_shrink.unwrap_or(initial.flex_shrink),
            justify_content: author.justify_content.unwrap_or(initial.justify_content),
            align_items: author.align_items.unwrap_or(initial.align_items),
            gap: author.gap.unwrap_or(initial.gap),
            overflow_x: author.overflow_x.unwrap_or(initial.overflow_x),
            overflow_y: author.overflow_y.unwrap_or(initial.overflow_y),

            font_family: author
                .font_family
                .clone()
                .unwrap_or_else(|| inherited.font_family.clone()),
            font_size,
            font_weight: author.font_weight.unwrap_or(inherited.font_weight),
            font_style: author.font_style.unwrap_or(inherited.font_style),
            text_align: author.text_align.unwrap_or(inherited.text_align),
            visibility: author.visibility.unwrap_or(inherited.visibility),

            animation_name: author.animation_name.clone(),
            animation_duration: author
                .animation_duration
                .unwrap_or(initial.animation_duration),
        }
    }

    fn hash_inherited<H: Hasher>(&self, state: &mut H) {
        self.color.hash(state);
        self.font_family.hash(state);
        self.font_size.hash(state);
        self.font_weight.hash(state);
        self.font_style.hash(state);
        self.text_align.hash(state);
        self.visibility.hash(state);
    }

    /// Structural hash of every property, used to detect changes.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Structural hash of the inheritable properties only.
    pub fn inherited_fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash_inherited(&mut hasher);
        hasher.finish()
    }
}
