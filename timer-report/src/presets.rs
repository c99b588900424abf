//! Built-in report templates

use crate::template::Template;

/// Template used when nothing else is selected
pub const DEFAULT_FORMAT: &str = "\nreal %r\nuser %u\nsys  %s\nmem  %R\n";

/// Seconds with two decimals, comparable with shell `time` builtins
pub const PORTABLE_FORMAT: &str = "real %pr\nuser %pu\nsys %ps\n";

/// Every field the measurement provides
pub const COMPLETE_FORMAT: &str = concat!(
    "\n",
    "real %r\n",
    "user %u\n",
    "sys  %s\n",
    "maximum resident set %R\n",
    "minor pagefaults %f\n",
    "major pagefaults %F\n",
    "voluntary context switches   %c\n",
    "involuntary context switches %C\n",
);

/// Named built-in template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// real, user, sys and peak memory
    Default,
    /// All measured fields
    Complete,
    /// Two-decimal seconds for real, user and sys
    Portable,
}

impl Preset {
    /// All presets
    pub const ALL: [Preset; 3] = [Preset::Default, Preset::Complete, Preset::Portable];

    /// Name used with `--preset`
    pub fn name(self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::Complete => "complete",
            Preset::Portable => "portable",
        }
    }

    /// Look up a preset by name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.name() == name)
    }

    /// Template source string
    pub fn source(self) -> &'static str {
        match self {
            Preset::Default => DEFAULT_FORMAT,
            Preset::Complete => COMPLETE_FORMAT,
            Preset::Portable => PORTABLE_FORMAT,
        }
    }

    /// Parsed template
    pub fn template(self) -> Template {
        match Template::parse(self.source()) {
            Ok(template) => template,
            Err(e) => unreachable!("built-in preset '{}' is invalid: {}", self.name(), e),
        }
    }
}
