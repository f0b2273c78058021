pub mod snapshot;
pub use snapshot::StorageBackend;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod throttle_repo;
pub use throttle_repo::ThrottleRepository;
pub mod reset_token_repo;
pub use reset_token_repo::ResetTokenRepository;
pub mod social_repo;
pub use social_repo::SocialRepository;
pub mod street_repo;
pub use street_repo::StreetRepository;
pub mod delivery_repo;
pub use delivery_repo::DeliveryRepository;
pub mod equipment_repo;
pub use equipment_repo::EquipmentRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod visit_repo;
pub use visit_repo::VisitRepository;

// Identificadores sequenciais por store, nunca reaproveitados.
pub(crate) fn next_id(seq: &mut u64) -> u64 {
    *seq += 1;
    *seq
}
