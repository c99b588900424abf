//! Template Rendering
//!
//! Writes a [`ResourceReport`] through a parsed [`Template`]. Output is
//! streamed to the sink in template order.

use crate::report::ResourceReport;
use crate::template::{Directive, Template};
use std::fmt;
use std::io::{self, Write};

/// Render `report` through `template` into `sink`.
pub fn render<W: Write + ?Sized>(
    template: &Template,
    report: &ResourceReport,
    sink: &mut W,
) -> io::Result<()> {
    write!(sink, "{}", Rendered { template, report })
}

/// Render into a `String`.
pub fn render_to_string(template: &Template, report: &ResourceReport) -> String {
    Rendered { template, report }.to_string()
}

/// A template bound to the report it is rendered against
struct Rendered<'a> {
    template: &'a Template,
    report: &'a ResourceReport,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for directive in self.template.directives() {
            match *directive {
                Directive::Literal(c) => write!(f, "{}", c)?,
                Directive::Escape(escape) => write!(f, "{}", escape.output())?,
                Directive::Percent => f.write_str("%")?,
                Directive::Specifier { option, field } => {
                    write!(f, "{}", self.report.quantity(field).formatted(option))?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::Preset;
    use crate::report::EventCount;

    fn sample_report() -> ResourceReport {
        ResourceReport {
            real_ns: 1_500,
            user_ns: 1_005_000_000,
            sys_ns: 999,
            max_rss_bytes: 1024,
            minor_faults: EventCount::from_raw(1_234_567),
            major_faults: EventCount::from_raw(0),
            voluntary_switches: EventCount::UNKNOWN,
            involuntary_switches: EventCount::from_raw(17),
        }
    }

    fn render_str(source: &str) -> String {
        let template = Template::parse(source).unwrap();
        render_to_string(&template, &sample_report())
    }

    #[test]
    fn test_render_specifiers() {
        assert_eq!(render_str("%r"), "1.500 us");
        assert_eq!(render_str("%pu"), "1.01");
        assert_eq!(render_str("%ms"), "999");
        assert_eq!(render_str("%MR"), "400");
        assert_eq!(render_str("%R"), "1.000 KiB");
        assert_eq!(render_str("%f"), "1 234 567");
        assert_eq!(render_str("%F"), "0");
        assert_eq!(render_str("%c"), "???");
        assert_eq!(render_str("%mC"), "17");
    }

    #[test]
    fn test_render_escapes_and_literals() {
        assert_eq!(render_str("a\\tb\\n"), "a\tb\n");
        assert_eq!(render_str("100%% \\% \\\\"), "100% % \\");
        assert_eq!(render_str(""), "");
    }

    #[test]
    fn test_render_default_preset() {
        let out = render_to_string(&Preset::Default.template(), &sample_report());
        assert_eq!(
            out,
            "\nreal 1.500 us\nuser 1.005  s\nsys    999 ns\nmem  1.000 KiB\n"
        );
    }

    #[test]
    fn test_render_portable_preset() {
        let out = render_to_string(&Preset::Portable.template(), &sample_report());
        assert_eq!(out, "real 0.00\nuser 1.01\nsys 0.00\n");
    }

    #[test]
    fn test_render_complete_preset_mentions_every_field() {
        let out = render_to_string(&Preset::Complete.template(), &sample_report());
        assert!(out.contains("maximum resident set 1.000 KiB"));
        assert!(out.contains("minor pagefaults 1 234 567"));
        assert!(out.contains("major pagefaults 0"));
        assert!(out.contains("voluntary context switches   ???"));
        assert!(out.contains("involuntary context switches 17"));
    }

    #[test]
    fn test_render_streams_to_writer() {
        let template = Template::parse("%mr|%mr").unwrap();
        let mut sink: Vec<u8> = b"prefix:".to_vec();
        render(&template, &sample_report(), &mut sink).unwrap();
        assert_eq!(sink, b"prefix:1500|1500");
    }

    #[test]
    fn test_string_and_writer_agree() {
        let template = Preset::Complete.template();
        let mut sink = Vec::new();
        render(&template, &sample_report(), &mut sink).unwrap();
        assert_eq!(
            String::from_utf8(sink).unwrap(),
            render_to_string(&template, &sample_report())
        );
    }
}
