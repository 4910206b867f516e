use auth::{AdminService, Result};
use keystone_core::SeedConfig;

/// Create the first super admin from configuration if the admin table is empty
pub async fn seed_database(admin_service: &AdminService, seed: &SeedConfig) -> Result<()> {
    let (Some(email), Some(password)) = (&seed.admin_email, &seed.admin_password) else {
        tracing::warn!("seed.admin_email / seed.admin_password not set, skipping admin seed");
        return Ok(());
    };
    let name = seed.admin_name.as_deref().unwrap_or("Super Admin");

    match admin_service.seed_first_super_admin(email, name, password).await? {
        Some(admin) => tracing::info!(admin_id = admin.id, email = %admin.email, "created first super admin"),
        None => tracing::info!("admins already exist, skipping seed"),
    }

    Ok(())
}
