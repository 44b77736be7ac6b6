use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use std::error::Error;
use std::time::Duration;

// Collection names match the ones the existing data set was written with.
pub const USERS: &str = "users";
pub const BASIC_INFOS: &str = "basicinfos";
pub const CAREER_OBJECTIVES: &str = "careerobjectives";
pub const EDUCATIONS: &str = "educations";
pub const KEY_SKILLS: &str = "keyskills";
pub const PORTFOLIOS: &str = "portfolios";
pub const WORK_EXPERIENCES: &str = "workexperiences";
pub const RESUMES: &str = "resumes";
pub const VIDEO_RESUMES: &str = "videoresumes";

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    /// Connects, verifies the server answers and makes sure indexes exist.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = ClientOptions::parse(uri).await?;

        client_options.app_name = Some("asap-server".to_string());
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(Duration::from_secs(300));
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let mongodb = Self::from_client(client, db_name);

        mongodb.ping().await?;
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Wraps a client without touching the network. The driver connects lazily.
    pub fn from_client(client: Client, db_name: &str) -> Self {
        let db = client.database(db_name);
        Self { client, db }
    }

    pub async fn ping(&self) -> Result<(), mongodb::error::Error> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// Creates the indexes the queries rely on. Unique indexes back the
    /// one-document-per-user collections and the unique e-mail rule.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        let unique = |keys: Document| {
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).build())
                .build()
        };
        let plain = |keys: Document| IndexModel::builder().keys(keys).build();

        let indexes = [
            (USERS, unique(doc! { "email": 1 })),
            (BASIC_INFOS, unique(doc! { "user": 1 })),
            (PORTFOLIOS, unique(doc! { "userId": 1 })),
            (CAREER_OBJECTIVES, unique(doc! { "userId": 1 })),
            (EDUCATIONS, plain(doc! { "userId": 1 })),
            (KEY_SKILLS, unique(doc! { "userId": 1 })),
            (WORK_EXPERIENCES, plain(doc! { "userId": 1, "startDate": -1 })),
            (RESUMES, plain(doc! { "userId": 1, "uploadedAt": -1 })),
            (VIDEO_RESUMES, plain(doc! { "userId": 1, "uploadedAt": -1 })),
        ];

        for (name, index) in indexes {
            let keys = index.keys.clone();
            match self.collection::<Document>(name).create_index(index).await {
                Ok(_) => log::info!("   ✅ Index ready: {}({})", name, keys),
                Err(e) => log::warn!("   ⚠️  Index {}({}) not created: {}", name, keys, e),
            }
        }

        log::info!("✅ Database indexes ready");
        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    #[cfg(test)]
    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
pub mod testing {
    use super::MongoDB;
    use mongodb::Client;

    /// A handle that never connects unless a query is issued. Good enough for
    /// handler tests that fail before reaching the database.
    pub async fn lazy_db() -> MongoDB {
        let client = Client::with_uri_str("mongodb://127.0.0.1:27017")
            .await
            .expect("static URI parses");
        MongoDB::from_client(client, "asap_test")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lazy_handle_does_not_connect() {
        let db = testing::lazy_db().await;
        assert_eq!(db.database().name(), "asap_test");
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_connect_and_ping() {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGO_URL").unwrap_or_else(|_| "mongodb://localhost:27017".into());
        let db = MongoDB::connect(&uri, "asap_test").await.unwrap();
        assert!(db.ping().await.is_ok());
    }
}
