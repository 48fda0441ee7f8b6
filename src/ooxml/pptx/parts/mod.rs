/// Parts of a PowerPoint package that are parsed rather than carried through.
pub mod presentation;
pub mod slide;

pub use presentation::PresentationPart;
pub use slide::SlidePart;
