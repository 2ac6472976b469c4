pub mod color;
pub mod value;
pub mod vector;

// Re-export commonly used types at the model level.
pub use color::Color;
pub use value::{Args, EnumType, Outcome, Value, ValueType};
pub use vector::{Vec2, Vec2Int, Vec3, Vec3Int};
