//! Database seeder for Patungan development and testing.
//!
//! Seeds two test users and a demo trip with three members (one of them
//! virtual), a fund contribution, and a handful of expenses.
//!
//! Usage: cargo run --bin seeder

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use patungan_db::entities::{
    expense_participants, expenses, sea_orm_active_enums::MemberRole, trip_members, trips, users,
};

/// Test user IDs (consistent for all seeds)
const ALICE_ID: &str = "00000000-0000-0000-0000-000000000001";
const BUDI_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Demo trip ID
const TRIP_ID: &str = "00000000-0000-0000-0000-000000000100";
/// Demo member IDs
const ALICE_MEMBER_ID: &str = "00000000-0000-0000-0000-000000000201";
const BUDI_MEMBER_ID: &str = "00000000-0000-0000-0000-000000000202";
const VIRTUAL_MEMBER_ID: &str = "00000000-0000-0000-0000-000000000203";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = patungan_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding test users...");
    seed_user(&db, ALICE_ID, "alice@example.com", "Alice").await;
    seed_user(&db, BUDI_ID, "budi@example.com", "Budi").await;

    println!("Seeding demo trip...");
    seed_trip(&db).await;

    println!("Seeding trip members...");
    seed_members(&db).await;

    println!("Seeding expenses...");
    seed_expenses(&db).await;

    println!("Seeding complete!");
}

fn id(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap()
}

/// Seeds a test user if it does not already exist.
async fn seed_user(db: &DatabaseConnection, user_id: &str, email: &str, name: &str) {
    if users::Entity::find_by_id(id(user_id))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  User {email} already exists, skipping");
        return;
    }

    let now = Utc::now().into();
    let user = users::ActiveModel {
        id: Set(id(user_id)),
        email: Set(email.to_string()),
        display_name: Set(name.to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    user.insert(db).await.expect("Failed to seed user");
}

/// Seeds the demo trip.
async fn seed_trip(db: &DatabaseConnection) {
    if trips::Entity::find_by_id(id(TRIP_ID))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Demo trip already exists, skipping");
        return;
    }

    let now = Utc::now().into();
    let trip = trips::ActiveModel {
        id: Set(id(TRIP_ID)),
        name: Set("Bali Getaway".to_string()),
        description: Set(Some("Demo trip for local development".to_string())),
        owner_id: Set(id(ALICE_ID)),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    trip.insert(db).await.expect("Failed to seed trip");
}

/// Seeds the trip members: two real users and a virtual placeholder.
async fn seed_members(db: &DatabaseConnection) {
    let now = Utc::now().into();
    let members = [
        trip_members::ActiveModel {
            id: Set(id(ALICE_MEMBER_ID)),
            trip_id: Set(id(TRIP_ID)),
            user_id: Set(Some(id(ALICE_ID))),
            is_virtual: Set(false),
            display_name: Set(None),
            role: Set(MemberRole::Admin),
            contribution: Set(Decimal::new(50_000, 2)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        },
        trip_members::ActiveModel {
            id: Set(id(BUDI_MEMBER_ID)),
            trip_id: Set(id(TRIP_ID)),
            user_id: Set(Some(id(BUDI_ID))),
            is_virtual: Set(false),
            display_name: Set(None),
            role: Set(MemberRole::Member),
            contribution: Set(Decimal::new(50_000, 2)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        },
        trip_members::ActiveModel {
            id: Set(id(VIRTUAL_MEMBER_ID)),
            trip_id: Set(id(TRIP_ID)),
            user_id: Set(None),
            is_virtual: Set(true),
            display_name: Set(Some("Li".to_string())),
            role: Set(MemberRole::Member),
            contribution: Set(Decimal::ZERO),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        },
    ];

    for member in members {
        let member_id = match &member.id {
            sea_orm::ActiveValue::Set(v) => *v,
            _ => unreachable!(),
        };
        if trip_members::Entity::find_by_id(member_id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            continue;
        }
        member.insert(db).await.expect("Failed to seed member");
    }
}

/// Seeds a fund-paid hotel booking and an out-of-pocket dinner.
async fn seed_expenses(db: &DatabaseConnection) {
    use sea_orm::{ColumnTrait, QueryFilter};

    let existing = expenses::Entity::find()
        .filter(expenses::Column::TripId.eq(id(TRIP_ID)))
        .one(db)
        .await
        .ok()
        .flatten();
    if existing.is_some() {
        println!("  Demo expenses already exist, skipping");
        return;
    }

    let now = Utc::now().into();
    let date = NaiveDate::from_ymd_opt(2026, 7, 20).unwrap();

    let entries: [(&str, Decimal, bool, [(Uuid, Decimal); 3]); 2] = [
        (
            "Hotel booking",
            Decimal::new(90_000, 2),
            true,
            [
                (id(ALICE_MEMBER_ID), Decimal::new(30_000, 2)),
                (id(BUDI_MEMBER_ID), Decimal::new(30_000, 2)),
                (id(VIRTUAL_MEMBER_ID), Decimal::new(30_000, 2)),
            ],
        ),
        (
            "Seafood dinner",
            Decimal::new(45_000, 2),
            false,
            [
                (id(ALICE_MEMBER_ID), Decimal::new(15_000, 2)),
                (id(BUDI_MEMBER_ID), Decimal::new(15_000, 2)),
                (id(VIRTUAL_MEMBER_ID), Decimal::new(15_000, 2)),
            ],
        ),
    ];

    for (description, amount, from_fund, shares) in entries {
        let expense_id = Uuid::new_v4();
        let expense = expenses::ActiveModel {
            id: Set(expense_id),
            trip_id: Set(id(TRIP_ID)),
            description: Set(description.to_string()),
            amount: Set(amount),
            is_income: Set(false),
            payer_member_id: Set(id(ALICE_MEMBER_ID)),
            is_paid_from_fund: Set(from_fund),
            expense_date: Set(date),
            created_by: Set(id(ALICE_ID)),
            created_at: Set(now),
            updated_at: Set(now),
        };
        expense.insert(db).await.expect("Failed to seed expense");

        for (member_id, share) in shares {
            let participant = expense_participants::ActiveModel {
                id: Set(Uuid::new_v4()),
                expense_id: Set(expense_id),
                trip_member_id: Set(member_id),
                share_amount: Set(share),
                created_at: Set(now),
            };
            participant
                .insert(db)
                .await
                .expect("Failed to seed participant");
        }
    }
}
