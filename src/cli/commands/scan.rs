//! `scan`: build navigation data from the site's content roots.

use tracing::info;

use crate::cli::args::{DataFormatArg, ScanArgs};
use crate::config;
use crate::error::BooknavError;
use crate::scanner::ContentScanner;
use crate::scanner::emit::{self, DataFormat};

/// Scans the site and writes navigation data to stdout or a file.
///
/// # Errors
///
/// Returns an error if the config is invalid, the site root is not a
/// directory, or the output cannot be written.
pub fn run(args: &ScanArgs) -> Result<(), BooknavError> {
    let mut config = config::resolve(&args.site.site_root, args.site.config.as_deref())?;
    if let Some(binding) = &args.binding {
        config.binding.clone_from(binding);
        config::loader::validate(&config)?;
    }

    let scanner = ContentScanner::new(&args.site.site_root, config.scan_options())?;
    let tree = scanner.scan(&config.content_roots());

    let format = match args.format {
        DataFormatArg::Json => DataFormat::Json,
        DataFormatArg::Js => DataFormat::Js,
    };

    match &args.output {
        Some(path) => {
            emit::write(&tree, path, format, &config.binding)?;
            info!(
                path = %path.display(),
                sections = tree.sections.len(),
                chapters = tree.chapter_count(),
                "wrote navigation data"
            );
        }
        None => print!("{}", emit::render(&tree, format, &config.binding)?),
    }
    Ok(())
}
