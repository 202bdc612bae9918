//! Concrete repository implementations.

pub mod delivery;
pub mod device;
pub mod recipient;
pub mod reminder;

pub use delivery::DeliveryRepository;
pub use device::DeviceTokenRepository;
pub use recipient::RecipientRepository;
pub use reminder::ReminderScheduleRepository;
