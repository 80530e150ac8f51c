//! PostgreSQL ledger behaviour under the seat guard.
//!
//! Runs against the database named by `REGISTRAR_TEST_DATABASE_URL`; each
//! test prints a notice and returns when the variable is unset. Every test
//! creates its own course and students, so runs can share one database.

use std::env;
use std::sync::OnceLock;

use chrono::Utc;
use futures::future::join_all;
use registrar::domain::ports::{
    CourseCatalogError, CourseCatalogRepository, InsertOutcome, RegistrationLedger,
    UserDirectory,
};
use registrar::domain::{
    Course, CourseAttributes, CourseDraft, CourseId, CourseStatus, Registration, RegistrationId,
    RegistrationStatus, User, UserId, UserRole, Username, fixture_accounts,
};
use registrar::outbound::persistence::{
    DbPool, DieselCourseCatalogRepository, DieselRegistrationLedger, DieselUserDirectory,
    PoolConfig, apply_migrations,
};
use uuid::Uuid;

const DATABASE_URL_ENV: &str = "REGISTRAR_TEST_DATABASE_URL";

static MIGRATED: OnceLock<()> = OnceLock::new();

struct Db {
    catalog: DieselCourseCatalogRepository,
    directory: DieselUserDirectory,
    ledger: DieselRegistrationLedger,
}

async fn connect() -> Option<Db> {
    let Ok(url) = env::var(DATABASE_URL_ENV) else {
        eprintln!("skipping: {DATABASE_URL_ENV} is not set");
        return None;
    };
    MIGRATED.get_or_init(|| {
        apply_migrations(&url).expect("migrations apply");
    });
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(16))
        .await
        .expect("pool builds");
    let directory = DieselUserDirectory::new(pool.clone());
    directory
        .upsert_accounts(&fixture_accounts())
        .await
        .expect("fixture accounts upserted");
    Some(Db {
        catalog: DieselCourseCatalogRepository::new(pool.clone()),
        directory,
        ledger: DieselRegistrationLedger::new(pool),
    })
}

fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_owned()
}

impl Db {
    async fn course(&self, max_students: u32) -> CourseId {
        let id = CourseId::random();
        let course = Course::create(
            id,
            &CourseDraft {
                code: format!("DB-{}", unique_suffix()),
                title: "Database Systems".to_owned(),
                max_students,
                min_students: 1,
                fee_cents: 0,
                schedule: None,
                status: Some(CourseStatus::Active),
            },
            Utc::now(),
        )
        .expect("valid course");
        self.catalog.insert(&course).await.expect("course inserted");
        id
    }

    async fn students(&self, count: usize) -> Vec<UserId> {
        let suffix = unique_suffix();
        let accounts: Vec<User> = (0..count)
            .map(|n| {
                let username =
                    Username::new(format!("s{suffix}-{n}")).expect("valid username");
                User::new(UserId::random(), username, format!("Student {n}"), UserRole::Student)
                    .expect("valid user")
            })
            .collect();
        self.directory
            .upsert_accounts(&accounts)
            .await
            .expect("students upserted");
        accounts.iter().map(|user| *user.id()).collect()
    }
}

fn registration(student: UserId, course_id: CourseId) -> Registration {
    Registration::enroll(RegistrationId::random(), student, course_id, Utc::now())
}

#[tokio::test]
async fn insert_outcomes_follow_the_seat_guard() {
    let Some(db) = connect().await else { return };
    let course_id = db.course(1).await;
    let students = db.students(2).await;

    let first = registration(students[0], course_id);
    assert_eq!(
        db.ledger.insert_within_capacity(&first).await.expect("insert"),
        InsertOutcome::Inserted
    );
    assert_eq!(
        db.ledger
            .insert_within_capacity(&registration(students[0], course_id))
            .await
            .expect("insert"),
        InsertOutcome::Duplicate
    );
    assert_eq!(
        db.ledger
            .insert_within_capacity(&registration(students[1], course_id))
            .await
            .expect("insert"),
        InsertOutcome::CourseFull { max_students: 1 }
    );
    assert_eq!(
        db.ledger
            .insert_within_capacity(&registration(students[1], CourseId::random()))
            .await
            .expect("insert"),
        InsertOutcome::CourseMissing
    );

    let stored = db
        .ledger
        .find_by_id(&first.id())
        .await
        .expect("lookup")
        .expect("registration stored");
    assert_eq!(stored.status(), RegistrationStatus::INITIAL);
    assert_eq!(db.ledger.count_active_by_course(&course_id).await.expect("count"), 1);
}

#[tokio::test]
async fn concurrent_inserts_never_overbook() {
    let Some(db) = connect().await else { return };
    let course_id = db.course(5).await;
    let students = db.students(20).await;

    let outcomes = join_all(students.iter().map(|student| {
        let ledger = db.ledger.clone();
        let registration = registration(*student, course_id);
        tokio::spawn(async move { ledger.insert_within_capacity(&registration).await })
    }))
    .await;

    let inserted = outcomes
        .into_iter()
        .map(|joined| joined.expect("task joins").expect("insert runs"))
        .filter(|outcome| *outcome == InsertOutcome::Inserted)
        .count();
    assert_eq!(inserted, 5);
    assert_eq!(db.ledger.count_active_by_course(&course_id).await.expect("count"), 5);
}

#[tokio::test]
async fn course_delete_refuses_while_seats_are_held() {
    let Some(db) = connect().await else { return };
    let course_id = db.course(3).await;
    let students = db.students(1).await;
    let held = registration(students[0], course_id);
    db.ledger.insert_within_capacity(&held).await.expect("insert");

    assert!(db.catalog.delete(&course_id).await.is_err());

    db.ledger.delete(&held.id()).await.expect("registration deleted");
    db.catalog.delete(&course_id).await.expect("course deleted");
    assert!(
        db.catalog
            .find_by_id(&course_id)
            .await
            .expect("lookup")
            .is_none()
    );
}

#[tokio::test]
async fn course_writes_compare_and_set_the_status() {
    let Some(db) = connect().await else { return };
    let course_id = db.course(2).await;
    let students = db.students(1).await;
    let snapshot = db
        .catalog
        .find_by_id(&course_id)
        .await
        .expect("lookup")
        .expect("course stored");

    db.catalog
        .update_status(&course_id, CourseStatus::Active, CourseStatus::Cancelled)
        .await
        .expect("course cancelled");
    let retitled = snapshot.clone().with_attributes(CourseAttributes {
        code: snapshot.code().clone(),
        title: "Advanced Database Systems".to_owned(),
        capacity: snapshot.capacity(),
        fee_cents: snapshot.fee_cents(),
        schedule: snapshot.schedule().map(str::to_owned),
    });
    let error = db
        .catalog
        .update(&retitled, CourseStatus::Active)
        .await
        .expect_err("status moved underneath the update");
    assert!(matches!(error, CourseCatalogError::StaleStatus { .. }));
    assert!(matches!(
        db.catalog
            .update_status(&course_id, CourseStatus::Active, CourseStatus::Closed)
            .await,
        Err(CourseCatalogError::StaleStatus { .. })
    ));

    let stored = db
        .catalog
        .find_by_id(&course_id)
        .await
        .expect("lookup")
        .expect("course stored");
    assert_eq!(stored.status(), CourseStatus::Cancelled);
    assert_eq!(stored.title(), "Database Systems");
    assert_eq!(
        db.ledger
            .insert_within_capacity(&registration(students[0], course_id))
            .await
            .expect("insert"),
        InsertOutcome::CourseNotOpen {
            status: CourseStatus::Cancelled
        }
    );
}

#[tokio::test]
async fn fixture_accounts_resolve_by_username() {
    let Some(db) = connect().await else { return };
    let admin = db
        .directory
        .find_by_username(&Username::new("admin").expect("valid username"))
        .await
        .expect("lookup")
        .expect("admin seeded");
    assert_eq!(admin.role(), UserRole::Admin);
}
