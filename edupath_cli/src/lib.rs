//! EduPath command-line front end

pub mod render;
pub mod session;

/// Convert a 1-based index typed by the user
pub fn to_index(position: usize) -> Option<usize> {
    position.checked_sub(1)
}
