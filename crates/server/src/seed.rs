use auth::AuthService;
use storage::{Database, NewJoke};
use tracing::info;

const SEED_USERNAME: &str = "kody";
const SEED_PASSWORD: &str = "twixrox";

const SEED_JOKES: [(&str, &str); 6] = [
    (
        "Road worker",
        "I never wanted to believe that my Dad was stealing from his job as a road worker. But when I got home, all the signs were there.",
    ),
    (
        "Frisbee",
        "I was wondering why the frisbee was getting bigger, then it hit me.",
    ),
    (
        "Trees",
        "Why do trees seem suspicious on sunny days? Dunno, they're just a bit shady.",
    ),
    (
        "Skeletons",
        "Why don't skeletons ride roller coasters? They don't have the stomach for it.",
    ),
    (
        "Hippos",
        "Why don't you find hippopotamuses hiding in trees? They're really good at it.",
    ),
    (
        "Dinner",
        "What did one plate say to the other plate? Dinner is on me!",
    ),
];

/// Seed the database with the starter user and jokes
pub async fn seed_database(auth_service: &AuthService, db: &dyn Database) -> anyhow::Result<()> {
    info!("Checking for seed user...");

    if auth_service.username_taken(SEED_USERNAME).await? {
        info!(username = SEED_USERNAME, "seed user already exists, skipping");
        return Ok(());
    }

    let user = auth_service.register(SEED_USERNAME, SEED_PASSWORD).await?;
    info!(username = SEED_USERNAME, user_id = %user.id, "created seed user");

    for (name, content) in SEED_JOKES {
        db.create_joke(NewJoke {
            name: name.to_string(),
            content: content.to_string(),
            jokester_id: user.id.clone(),
        })
        .await?;
    }

    info!(count = SEED_JOKES.len(), "seeded jokes");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::SessionCodec;
    use std::sync::Arc;
    use storage::MemoryDatabase;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db: Arc<dyn Database> = Arc::new(MemoryDatabase::new());
        let auth_service = AuthService::new(db.clone(), SessionCodec::new("seed").unwrap());

        seed_database(&auth_service, db.as_ref()).await.unwrap();
        seed_database(&auth_service, db.as_ref()).await.unwrap();

        assert_eq!(db.count_jokes().await.unwrap(), SEED_JOKES.len());
        assert!(auth_service.login(SEED_USERNAME, SEED_PASSWORD).await.unwrap().is_some());
    }
}
