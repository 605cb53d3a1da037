//! Database seeder for Prestar development and testing.
//!
//! Seeds a test user, company settings with opening capital, one
//! client, and one monthly loan so the dashboard has data to show.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use prestar_core::amortization::RatePeriod;
use prestar_core::auth::hash_password;
use prestar_db::entities::clients;
use prestar_db::repositories::client::{ClientRepository, CreateClientInput};
use prestar_db::repositories::company::{CompanyRepository, UpsertCompanyInput};
use prestar_db::repositories::loan::{CreateLoanInput, LoanRepository};
use prestar_db::repositories::user::{CreateUserInput, UserRepository};
use prestar_db::entities::sea_orm_active_enums::CreditScore;
use prestar_shared::types::PageRequest;

/// Email of the seeded development user.
const TEST_USER_EMAIL: &str = "test@prestar.dev";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = prestar_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding test user...");
    let owner_id = seed_test_user(&db).await;

    println!("Seeding company settings...");
    seed_company(&db, owner_id).await;

    println!("Seeding client and loan...");
    seed_client_with_loan(&db, owner_id).await;

    println!("Seeding complete!");
}

/// Seeds a test user for development; returns its ID.
async fn seed_test_user(db: &DatabaseConnection) -> Uuid {
    let repo = UserRepository::new(db.clone());

    if let Ok(Some(user)) = repo.find_by_email(TEST_USER_EMAIL).await {
        println!("  Test user already exists, skipping...");
        return user.id;
    }

    let user = repo
        .create_user(CreateUserInput {
            email: TEST_USER_EMAIL.to_string(),
            password_hash: hash_password("password123").expect("Failed to hash password"),
            full_name: "Test User".to_string(),
        })
        .await
        .expect("Failed to seed user");

    user.id
}

/// Seeds company settings with opening capital.
async fn seed_company(db: &DatabaseConnection, owner_id: Uuid) {
    let repo = CompanyRepository::new(db.clone());
    repo.upsert_settings(
        owner_id,
        UpsertCompanyInput {
            company_name: "Prestar Demo Ltda".to_string(),
            document: Some("12.345.678/0001-00".to_string()),
            email: Some("contato@prestar.dev".to_string()),
            phone: Some("+55 11 99999-0000".to_string()),
            address: Some("Av. Paulista, 1000 - São Paulo".to_string()),
            initial_capital: dec!(100000),
        },
    )
    .await
    .expect("Failed to seed company settings");
}

/// Seeds a client and a monthly loan against the demo treasury.
async fn seed_client_with_loan(db: &DatabaseConnection, owner_id: Uuid) {
    let client_repo = ClientRepository::new(db.clone());

    let (existing, _) = client_repo
        .list_clients(owner_id, Default::default(), &PageRequest::default())
        .await
        .expect("Failed to list clients");
    if !existing.is_empty() {
        println!("  Clients already exist, skipping...");
        return;
    }

    let client: clients::Model = client_repo
        .create_client(CreateClientInput {
            owner_id,
            name: "Maria Oliveira".to_string(),
            national_id: "123.456.789-00".to_string(),
            email: Some("maria@example.com".to_string()),
            phone: Some("+55 11 98888-1111".to_string()),
            address: Some("Rua das Flores, 42 - São Paulo".to_string()),
            monthly_income: dec!(5500),
            credit_score: CreditScore::Good,
        })
        .await
        .expect("Failed to seed client");

    let loan_repo = LoanRepository::new(db.clone());
    loan_repo
        .create_loan(CreateLoanInput {
            owner_id,
            client_id: client.id,
            principal: dec!(10000),
            rate_percent: dec!(2.5),
            rate_period: RatePeriod::Monthly,
            installments: 12,
            days: 0,
            start_date: Utc::now().date_naive(),
        })
        .await
        .expect("Failed to seed loan");
}
