use std::process::ExitCode;

use clap::Parser;
use dotmacos::{Cli, Dotmacos, DotmacosError, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("warning: logging disabled: {e}");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), DotmacosError> {
    let mut session = Dotmacos::builder()
        .settings_path(cli.settings)
        .format(cli.format)
        .build()?;
    session.handle_and_print(&cli.command.into_action())
}

/// Print `error` to stderr behind an `E` marker.
fn report(error: &DotmacosError) {
    eprintln!("{}", render_error(error));
}

/// Indent continuation lines under the marker.
fn render_error(error: &DotmacosError) -> String {
    format!("E {}", error.to_string().trim().replace('\n', "\n  "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotmacos::FileFormat;

    #[test]
    fn error_is_plain_marked_text() {
        let rendered = render_error(&DotmacosError::UnsupportedFormat(FileFormat::Yaml));
        assert!(rendered.starts_with("E "));
        assert!(!rendered.contains('\x1b'));
    }
}
