pub mod pedagogy;
pub mod session;

pub use pedagogy::{GradeLevel, PedagogyModel};
pub use session::{display_name, ImageAttachment, PlannerSession, Stage, SESSION_KEY, UNNAMED_STUDENT};
