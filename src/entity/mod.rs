pub mod slots;

pub use slots::Entity as Slots;
