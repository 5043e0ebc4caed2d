/// Index into the shared pipe color palette ([`crate::scene::PIPE_COLORS`]).
///
/// Assigned once when a pipe spawns and stable for the pipe's lifetime.
pub type ColorIndex = usize;
