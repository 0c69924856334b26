/// User interface pieces
///
/// - `table.rs` - the book table, which receives sort updates
/// - `toast.rs` - fading status message
/// - `palette.rs` - colors and theme

pub mod palette;
pub mod table;
pub mod toast;
