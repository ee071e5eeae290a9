//! Session verification against the credential store.
//!
//! Both checks are read-only and fail closed: a missing row is `false`,
//! a store fault is an error, neither lets the request through.

use anyhow::Result;

use quill_crypto::fingerprint::password_fingerprint;
use quill_db::Database;
use quill_db::models::UserRow;

use crate::token::SessionClaim;

/// The claim still describes the stored account: same username and same
/// password hash as when it was issued.
pub fn verify_user(db: &Database, claim: &SessionClaim) -> Result<bool> {
    let row = db.get_user_by_id(claim.user_id)?;
    Ok(row.is_some_and(|row| claim_matches(claim, &row)))
}

/// As [`verify_user`], and the authenticated user's own row carries the
/// admin role.
pub fn verify_admin(db: &Database, claim: &SessionClaim) -> Result<bool> {
    let row = db.get_user_by_id(claim.user_id)?;
    Ok(row.is_some_and(|row| claim_matches(claim, &row) && row.role().is_admin()))
}

fn claim_matches(claim: &SessionClaim, row: &UserRow) -> bool {
    row.username == claim.username && password_fingerprint(&row.password) == claim.password_fingerprint
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenCodec;
    use chrono::Duration;
    use quill_types::models::Role;

    struct Fixture {
        db: Database,
        codec: TokenCodec,
        admin: i64,
        alice: i64,
    }

    fn fixture() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let admin = db.create_user("admin", "admin-hash", Role::Admin).unwrap().unwrap();
        let alice = db.create_user("alice", "alice-hash", Role::User).unwrap().unwrap();
        Fixture {
            db,
            codec: TokenCodec::new(b"session-test-secret", Duration::days(1)),
            admin,
            alice,
        }
    }

    #[test]
    fn valid_claim_accepted() {
        let f = fixture();
        let claim = f.codec.mint(f.alice, "alice", "alice-hash");
        assert!(verify_user(&f.db, &claim).unwrap());
    }

    #[test]
    fn stale_password_rejected() {
        let f = fixture();
        let claim = f.codec.mint(f.alice, "alice", "old-hash");
        assert!(!verify_user(&f.db, &claim).unwrap());
    }

    #[test]
    fn username_mismatch_rejected() {
        let f = fixture();
        // Right id and hash, wrong name.
        let claim = f.codec.mint(f.alice, "mallory", "alice-hash");
        assert!(!verify_user(&f.db, &claim).unwrap());
    }

    #[test]
    fn unknown_or_deleted_user_fails_closed() {
        let f = fixture();
        let ghost = f.codec.mint(999, "ghost", "x");
        assert!(!verify_user(&f.db, &ghost).unwrap());
        assert!(!verify_admin(&f.db, &ghost).unwrap());

        let claim = f.codec.mint(f.alice, "alice", "alice-hash");
        f.db.take_user(f.alice).unwrap();
        assert!(!verify_user(&f.db, &claim).unwrap());
    }

    #[test]
    fn admin_requires_admin_role() {
        let f = fixture();
        let admin = f.codec.mint(f.admin, "admin", "admin-hash");
        assert!(verify_admin(&f.db, &admin).unwrap());
        assert!(verify_user(&f.db, &admin).unwrap());

        let alice = f.codec.mint(f.alice, "alice", "alice-hash");
        assert!(verify_user(&f.db, &alice).unwrap());
        assert!(!verify_admin(&f.db, &alice).unwrap());
    }

    #[test]
    fn claimed_admin_name_is_not_enough() {
        let f = fixture();
        // Alice's id claiming the admin's name, or the admin's name with
        // alice's hash: neither matches a single row.
        let forged = f.codec.mint(f.alice, "admin", "admin-hash");
        assert!(!verify_admin(&f.db, &forged).unwrap());

        let forged = f.codec.mint(f.admin, "admin", "alice-hash");
        assert!(!verify_admin(&f.db, &forged).unwrap());
    }
}
