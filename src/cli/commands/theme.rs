//! `theme`: show or change the stored theme preference.

use crate::cli::args::ThemeArgs;
use crate::context::AppContext;
use crate::error::BooknavError;
use crate::model::NavigationTree;

/// Prints the effective theme, after toggling or setting it if asked.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or written.
pub fn run(args: &ThemeArgs) -> Result<(), BooknavError> {
    let store = super::open_store(args.store.as_deref())?;
    let mut ctx = AppContext::new(NavigationTree::default(), store, args.system);

    if args.toggle {
        ctx.toggle_theme()?;
    } else if let Some(theme) = args.set {
        ctx.set_theme(theme)?;
    }

    println!("{}", ctx.theme);
    Ok(())
}
