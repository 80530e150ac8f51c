//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after a migration changes a table.

diesel::table! {
    /// Directory accounts.
    users (id) {
        id -> Uuid,
        /// Lower-case login name, unique.
        username -> Varchar,
        display_name -> Varchar,
        /// One of `student`, `instructor`, `admin`.
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalogue courses.
    courses (id) {
        id -> Uuid,
        /// Upper-case course code, unique.
        code -> Varchar,
        title -> Varchar,
        max_students -> Int4,
        min_students -> Int4,
        status -> Varchar,
        fee_cents -> Int4,
        schedule -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Registration ledger.
    ///
    /// The partial unique index `registrations_active_user_course_key` allows
    /// one `pending`/`enrolled` row per (user, course).
    registrations (id) {
        id -> Uuid,
        user_id -> Uuid,
        course_id -> Uuid,
        status -> Varchar,
        grade -> Nullable<Varchar>,
        payment_status -> Varchar,
        amount_paid_cents -> Int4,
        registration_date -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(registrations -> courses (course_id));
diesel::joinable!(registrations -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(courses, registrations, users);
