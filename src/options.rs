/// Lexical and parser feature switches.
///
/// Every feature is enabled by default. [`Options::for_parser`] is the
/// default used by [`parse`](crate::parse), which additionally turns off
/// contextual `goto` so that `goto` is always a keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// `::name::` labels (the `::` punctuator).
    pub labels: bool,
    /// Lex `goto` as an identifier; the parser recognises `goto name`
    /// from context.
    pub contextual_goto: bool,
    /// `//` floor division.
    pub integer_division: bool,
    /// `&`, `|`, `~`, `<<`, `>>`.
    pub bitwise_operators: bool,
    /// Trailing `i`/`I` on numbers.
    pub imaginary_numbers: bool,
    /// Trailing `u`/`U`, `LL`, `ULL` on integers.
    pub integer_suffixes: bool,
    /// Bytes >= 0x80 may appear in identifiers.
    pub extended_identifiers: bool,
    /// Maximum nesting depth before the parser gives up with
    /// `NestingTooDeep`. Blocks, sub-expressions, prefix expressions,
    /// call argument lists and table constructors each take one level.
    pub max_depth: usize,
}

/// Nesting limit used by the default options.
pub const DEFAULT_MAX_DEPTH: usize = 200;

impl Options {
    /// All features enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            labels: true,
            contextual_goto: true,
            integer_division: true,
            bitwise_operators: true,
            imaginary_numbers: true,
            integer_suffixes: true,
            extended_identifiers: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// All features enabled except contextual `goto`.
    #[must_use]
    pub const fn for_parser() -> Self {
        Self::new().contextual_goto(false)
    }

    /// Plain Lua 5.1 grammar: no labels, `goto`, `//`, bitwise
    /// operators, or number suffixes.
    #[must_use]
    pub const fn lua51() -> Self {
        Self {
            labels: false,
            contextual_goto: true,
            integer_division: false,
            bitwise_operators: false,
            imaginary_numbers: false,
            integer_suffixes: false,
            extended_identifiers: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Toggle `::name::` labels.
    #[must_use]
    pub const fn labels(mut self, enabled: bool) -> Self {
        self.labels = enabled;
        self
    }

    /// Toggle lexing `goto` as an identifier.
    #[must_use]
    pub const fn contextual_goto(mut self, enabled: bool) -> Self {
        self.contextual_goto = enabled;
        self
    }

    /// Toggle the `//` operator.
    #[must_use]
    pub const fn integer_division(mut self, enabled: bool) -> Self {
        self.integer_division = enabled;
        self
    }

    /// Toggle the bitwise operators and `<<`, `>>`.
    #[must_use]
    pub const fn bitwise_operators(mut self, enabled: bool) -> Self {
        self.bitwise_operators = enabled;
        self
    }

    /// Toggle the `i` suffix on numbers.
    #[must_use]
    pub const fn imaginary_numbers(mut self, enabled: bool) -> Self {
        self.imaginary_numbers = enabled;
        self
    }

    /// Toggle the `u`, `LL` and `ULL` integer suffixes.
    #[must_use]
    pub const fn integer_suffixes(mut self, enabled: bool) -> Self {
        self.integer_suffixes = enabled;
        self
    }

    /// Toggle non-ASCII bytes in identifiers.
    #[must_use]
    pub const fn extended_identifiers(mut self, enabled: bool) -> Self {
        self.extended_identifiers = enabled;
        self
    }

    /// Set the nesting limit.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}
