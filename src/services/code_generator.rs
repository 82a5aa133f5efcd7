//! Generated item codes for products and vehicles.
//!
//! A code looks like `TAAMMA-1`: two characters each from the item name, its
//! category name and its brand name, then a per-prefix sequence number that
//! is one past the highest sequence already stored under that prefix.
//!
//! Generation is read-only. Two concurrent creates can compute the same code;
//! the unique index on the code column rejects the second insert and
//! [`insert_with_generated_code`] derives a fresh code for it.

use crate::{
    entities::{brand, category, product, vehicle},
    errors::ServiceError,
};
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect, SqlErr,
};
use std::fmt;
use tracing::{debug, error, instrument, warn};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Character used to fill abbreviations shorter than two characters.
pub const PAD_CHAR: char = 'X';

/// Width of each abbreviated segment.
const SEGMENT_LEN: usize = 2;

/// An entity whose rows carry a generated code.
pub trait CodedEntity: EntityTrait {
    /// Singular label used in logs and error messages.
    const KIND: &'static str;

    /// Column storing the generated code.
    fn code_column() -> Self::Column;
}

impl CodedEntity for product::Entity {
    const KIND: &'static str = "producto";

    fn code_column() -> Self::Column {
        product::Column::Code
    }
}

impl CodedEntity for vehicle::Entity {
    const KIND: &'static str = "vehículo";

    fn code_column() -> Self::Column {
        vehicle::Column::Code
    }
}

/// Strips diacritics and everything that is not an ASCII letter or digit, then upper-cases.
pub fn normalize_segment(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036F}').contains(c))
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// First two normalized characters, right-padded with [`PAD_CHAR`].
pub fn abbreviate(input: &str) -> String {
    let mut segment: String = normalize_segment(input).chars().take(SEGMENT_LEN).collect();
    while segment.len() < SEGMENT_LEN {
        segment.push(PAD_CHAR);
    }
    segment
}

/// The six-character block in front of the sequence number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodePrefix(String);

impl CodePrefix {
    /// Builds the prefix in name, category, brand order.
    pub fn from_names(name: &str, category: &str, brand: &str) -> Self {
        let mut prefix = String::with_capacity(SEGMENT_LEN * 3);
        prefix.push_str(&abbreviate(name));
        prefix.push_str(&abbreviate(category));
        prefix.push_str(&abbreviate(brand));
        CodePrefix(prefix)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `LIKE` pattern matching every code issued under this prefix.
    ///
    /// The prefix is `[A-Z0-9]` only, so no wildcard escaping is needed.
    pub fn like_pattern(&self) -> String {
        format!("{}-%", self.0)
    }

    pub fn with_sequence(&self, sequence: u64) -> String {
        format!("{}-{}", self.0, sequence)
    }
}

impl fmt::Display for CodePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric suffix after the final `-`, if it is made only of ASCII digits and fits in a `u64`.
pub fn parse_sequence(code: &str) -> Option<u64> {
    let (_, suffix) = code.rsplit_once('-')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// One past the highest well-formed sequence among `codes`, or 1 when there is none.
///
/// The maximum is numeric, so `-10` wins over `-9` regardless of scan order.
pub fn next_sequence<I, S>(codes: I) -> u64
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes
        .into_iter()
        .filter_map(|code| parse_sequence(code.as_ref()))
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// The attributes a code is derived from.
#[derive(Clone, Copy, Debug)]
pub struct CodeInput<'a> {
    pub name: &'a str,
    pub category_id: Uuid,
    pub brand_id: Uuid,
}

async fn category_name<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<String, ServiceError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| {
            error!(category_id = %id, error = %e, "category lookup failed");
            ServiceError::LookupFailure(format!("Error al consultar la categoría {}", id))
        })?
        .map(|row| row.name)
        .ok_or_else(|| ServiceError::LookupFailure(format!("La categoría {} no existe.", id)))
}

async fn brand_name<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<String, ServiceError> {
    brand::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| {
            error!(brand_id = %id, error = %e, "brand lookup failed");
            ServiceError::LookupFailure(format!("Error al consultar la marca {}", id))
        })?
        .map(|row| row.name)
        .ok_or_else(|| ServiceError::LookupFailure(format!("La marca {} no existe.", id)))
}

/// Every stored code under `prefix`, matched case-insensitively, in ascending order.
async fn existing_codes<E, C>(db: &C, prefix: &CodePrefix) -> Result<Vec<String>, ServiceError>
where
    E: CodedEntity,
    C: ConnectionTrait,
{
    let column = E::code_column();
    E::find()
        .select_only()
        .column(column)
        .filter(Expr::expr(Func::upper(Expr::col(column))).like(prefix.like_pattern()))
        .order_by_asc(column)
        .into_tuple::<String>()
        .all(db)
        .await
        .map_err(|e| {
            error!(prefix = %prefix, error = %e, "code prefix scan failed");
            ServiceError::LookupFailure(format!("Error al buscar códigos con prefijo {}", prefix))
        })
}

/// Derives the next free code for `input` from the current store contents.
#[instrument(skip(db), fields(kind = E::KIND))]
pub async fn generate_code<E, C>(db: &C, input: CodeInput<'_>) -> Result<String, ServiceError>
where
    E: CodedEntity,
    C: ConnectionTrait,
{
    let (category, brand) = tokio::try_join!(
        category_name(db, input.category_id),
        brand_name(db, input.brand_id)
    )?;

    let prefix = CodePrefix::from_names(input.name, &category, &brand);
    let existing = existing_codes::<E, C>(db, &prefix).await?;
    let sequence = next_sequence(&existing);

    debug!(
        prefix = %prefix,
        matches = existing.len(),
        sequence,
        "derived code sequence"
    );

    Ok(prefix.with_sequence(sequence))
}

/// True when the store rejected a write because of a unique index.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Generates a code, builds the row with it and inserts it, regenerating on
/// unique-index collisions up to `max_attempts` times.
///
/// Lookup failures and any other store error end the loop immediately.
pub async fn insert_with_generated_code<A, C, F>(
    db: &C,
    input: CodeInput<'_>,
    max_attempts: u32,
    build: F,
) -> Result<<A::Entity as EntityTrait>::Model, ServiceError>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send + 'static,
    A::Entity: CodedEntity,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
    F: Fn(String) -> A,
{
    let max_attempts = max_attempts.max(1);
    let mut last_code = String::new();

    for attempt in 1..=max_attempts {
        let code = generate_code::<A::Entity, C>(db, input).await?;

        match build(code.clone()).insert(db).await {
            Ok(model) => return Ok(model),
            Err(err) if is_unique_violation(&err) => {
                warn!(
                    kind = <A::Entity as CodedEntity>::KIND,
                    code = %code,
                    attempt,
                    max_attempts,
                    "generated code already taken; regenerating"
                );
                last_code = code;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(ServiceError::UniquenessConflict(format!(
        "No se pudo asignar un código único de {} tras {} intentos (último: {}).",
        <A::Entity as CodedEntity>::KIND,
        max_attempts,
        last_code
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrated_memory_pool;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use proptest::prelude::*;
    use rstest::rstest;
    use sea_orm::{DatabaseConnection, Set};
    use std::collections::BTreeSet;

    #[rstest]
    #[case("Taladro Andino", "TALADROANDINO")]
    #[case("Óscar", "OSCAR")]
    #[case("  ñandú-3 ", "NANDU3")]
    #[case("!!!", "")]
    #[case("", "")]
    fn normalizes_segments(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_segment(input), expected);
    }

    #[rstest]
    #[case("Makita", "MA")]
    #[case("a", "AX")]
    #[case("", "XX")]
    #[case("é", "EX")]
    #[case("-- 9 --", "9X")]
    fn abbreviates_to_two_chars(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(abbreviate(input), expected);
    }

    #[test]
    fn prefix_concatenates_name_category_brand() {
        let prefix = CodePrefix::from_names("TALADRO ANDINO", "AMBIENTES", "Makita");
        assert_eq!(prefix.as_str(), "TAAMMA");
        assert_eq!(prefix.like_pattern(), "TAAMMA-%");
        assert_eq!(prefix.with_sequence(1), "TAAMMA-1");
    }

    #[rstest]
    #[case("PFX-5", Some(5))]
    #[case("PFX-010", Some(10))]
    #[case("PFX-ABC", None)]
    #[case("PFX-", None)]
    #[case("PFX-+3", None)]
    #[case("PFX-1-7", Some(7))]
    #[case("PFX", None)]
    #[case("PFX-99999999999999999999999", None)]
    fn parses_trailing_sequence(#[case] code: &str, #[case] expected: Option<u64>) {
        assert_eq!(parse_sequence(code), expected);
    }

    #[test]
    fn next_sequence_is_max_plus_one() {
        assert_eq!(next_sequence(Vec::<String>::new()), 1);
        assert_eq!(next_sequence(["PFX-1", "PFX-2", "PFX-5"]), 6);
        assert_eq!(next_sequence(["PFX-9", "PFX-10"]), 11);
        assert_eq!(next_sequence(["PFX-ABC", "PFX-"]), 1);
        assert_eq!(next_sequence(["PFX-ABC", "PFX-3"]), 4);
    }

    proptest! {
        #[test]
        fn plain_inputs_use_their_first_two_chars(
            name in "[a-zA-Z0-9]{2,12}",
            cat in "[a-zA-Z0-9]{2,12}",
            brand in "[a-zA-Z0-9]{2,12}",
        ) {
            let prefix = CodePrefix::from_names(&name, &cat, &brand);
            let expected = format!(
                "{}{}{}",
                &name[..2].to_ascii_uppercase(),
                &cat[..2].to_ascii_uppercase(),
                &brand[..2].to_ascii_uppercase(),
            );
            prop_assert_eq!(prefix.as_str(), expected.as_str());
        }

        #[test]
        fn abbreviation_is_always_two_upper_alnum(input in ".*") {
            let abbr = abbreviate(&input);
            prop_assert_eq!(abbr.len(), 2);
            prop_assert!(abbr.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    async fn seed_category(db: &DatabaseConnection, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        category::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            description: Set(None),
            active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .unwrap();
        id
    }

    async fn seed_brand(db: &DatabaseConnection, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        brand::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            description: Set(None),
            active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .unwrap();
        id
    }

    fn product_row(code: String, category_id: Uuid, brand_id: Uuid) -> product::ActiveModel {
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code),
            name: Set("TALADRO ANDINO".to_string()),
            description: Set(String::new()),
            image_url: Set(None),
            active: Set(true),
            category_id: Set(category_id),
            subcategory_id: Set(Uuid::new_v4()),
            brand_id: Set(brand_id),
            stock: Set(0),
            created_at: Set(Utc::now()),
        }
    }

    async fn seed_product_code(db: &DatabaseConnection, code: &str, cat: Uuid, brand: Uuid) {
        product_row(code.to_string(), cat, brand)
            .insert(db)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn end_to_end_first_code_is_taamma_1() {
        let db = migrated_memory_pool().await;
        let cat = seed_category(&db, "AMBIENTES").await;
        let brand = seed_brand(&db, "Makita").await;

        let code = generate_code::<product::Entity, _>(
            &db,
            CodeInput {
                name: "Taladro Andino",
                category_id: cat,
                brand_id: brand,
            },
        )
        .await
        .unwrap();

        assert_eq!(code, "TAAMMA-1");
    }

    #[tokio::test]
    async fn category_segment_comes_from_the_category_name() {
        let db = migrated_memory_pool().await;
        let cat = seed_category(&db, "ANDAMIOS").await;
        let brand = seed_brand(&db, "MAKITA").await;

        let code = generate_code::<product::Entity, _>(
            &db,
            CodeInput {
                name: "Taladro Andino",
                category_id: cat,
                brand_id: brand,
            },
        )
        .await
        .unwrap();

        // Only the first word of the item name contributes.
        assert_eq!(code, "TAANMA-1");
    }

    #[tokio::test]
    async fn skips_past_highest_existing_sequence() {
        let db = migrated_memory_pool().await;
        let cat = seed_category(&db, "AMBIENTES").await;
        let brand = seed_brand(&db, "MAKITA").await;
        for code in ["TAAMMA-1", "TAAMMA-2", "TAAMMA-5", "TAAMMA-ABC", "taamma-3"] {
            seed_product_code(&db, code, cat, brand).await;
        }
        // Another prefix must not influence the sequence.
        seed_product_code(&db, "TOAMMA-40", cat, brand).await;

        let code = generate_code::<product::Entity, _>(
            &db,
            CodeInput {
                name: "taladro",
                category_id: cat,
                brand_id: brand,
            },
        )
        .await
        .unwrap();

        assert_eq!(code, "TAAMMA-6");
    }

    #[tokio::test]
    async fn numeric_max_beats_lexicographic_order() {
        let db = migrated_memory_pool().await;
        let cat = seed_category(&db, "AMBIENTES").await;
        let brand = seed_brand(&db, "MAKITA").await;
        seed_product_code(&db, "TAAMMA-9", cat, brand).await;
        seed_product_code(&db, "TAAMMA-10", cat, brand).await;

        let code = generate_code::<product::Entity, _>(
            &db,
            CodeInput {
                name: "TALADRO",
                category_id: cat,
                brand_id: brand,
            },
        )
        .await
        .unwrap();

        assert_eq!(code, "TAAMMA-11");
    }

    #[tokio::test]
    async fn empty_reference_names_fall_back_to_padding() {
        let db = migrated_memory_pool().await;
        let cat = seed_category(&db, "").await;
        let brand = seed_brand(&db, "é").await;

        let code = generate_code::<vehicle::Entity, _>(
            &db,
            CodeInput {
                name: "Óscar",
                category_id: cat,
                brand_id: brand,
            },
        )
        .await
        .unwrap();

        assert_eq!(code, "OSXXEX-1");
    }

    #[tokio::test]
    async fn product_and_vehicle_sequences_are_independent() {
        let db = migrated_memory_pool().await;
        let cat = seed_category(&db, "AMBIENTES").await;
        let brand = seed_brand(&db, "MAKITA").await;
        seed_product_code(&db, "TAAMMA-7", cat, brand).await;

        let code = generate_code::<vehicle::Entity, _>(
            &db,
            CodeInput {
                name: "TALADRO",
                category_id: cat,
                brand_id: brand,
            },
        )
        .await
        .unwrap();

        assert_eq!(code, "TAAMMA-1");
    }

    #[tokio::test]
    async fn missing_references_are_lookup_failures() {
        let db = migrated_memory_pool().await;
        let brand = seed_brand(&db, "MAKITA").await;

        let err = generate_code::<product::Entity, _>(
            &db,
            CodeInput {
                name: "TALADRO",
                category_id: Uuid::new_v4(),
                brand_id: brand,
            },
        )
        .await
        .unwrap_err();
        assert_matches!(err, ServiceError::LookupFailure(_));

        let cat = seed_category(&db, "AMBIENTES").await;
        let err = generate_code::<product::Entity, _>(
            &db,
            CodeInput {
                name: "TALADRO",
                category_id: cat,
                brand_id: Uuid::new_v4(),
            },
        )
        .await
        .unwrap_err();
        assert_matches!(err, ServiceError::LookupFailure(_));
    }

    #[tokio::test]
    async fn store_errors_during_lookup_stay_out_of_the_message() {
        let db = migrated_memory_pool().await;
        let cat = seed_category(&db, "AMBIENTES").await;
        let brand = seed_brand(&db, "MAKITA").await;
        db.execute_unprepared("ALTER TABLE marcas RENAME TO marcas_old")
            .await
            .unwrap();

        let err = generate_code::<product::Entity, _>(
            &db,
            CodeInput {
                name: "TALADRO",
                category_id: cat,
                brand_id: brand,
            },
        )
        .await
        .unwrap_err();

        assert_matches!(err, ServiceError::LookupFailure(_));
        let message = err.response_message();
        assert!(message.contains(&format!("Error al consultar la marca {}", brand)));
        assert!(!message.contains("marcas"), "{message}");
        assert!(!message.contains("no such table"), "{message}");
    }

    #[tokio::test]
    async fn duplicate_code_insert_is_a_unique_violation() {
        let db = migrated_memory_pool().await;
        let cat = seed_category(&db, "AMBIENTES").await;
        let brand = seed_brand(&db, "MAKITA").await;
        seed_product_code(&db, "TAAMMA-1", cat, brand).await;

        let err = product_row("TAAMMA-1".to_string(), cat, brand)
            .insert(&db)
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn retry_loop_recovers_from_a_stale_code() {
        let db = migrated_memory_pool().await;
        let cat = seed_category(&db, "AMBIENTES").await;
        let brand = seed_brand(&db, "MAKITA").await;
        let input = CodeInput {
            name: "TALADRO",
            category_id: cat,
            brand_id: brand,
        };

        // The first attempt is forced onto a code that is already taken.
        seed_product_code(&db, "TAAMMA-1", cat, brand).await;
        let calls = std::sync::atomic::AtomicU32::new(0);
        let row = insert_with_generated_code(&db, input, 3, |code| {
            let n = calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let code = if n == 0 { "TAAMMA-1".to_string() } else { code };
            product_row(code, cat, brand)
        })
        .await
        .unwrap();

        assert_eq!(row.code, "TAAMMA-2");
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retry_budget_exhaustion_is_a_uniqueness_conflict() {
        let db = migrated_memory_pool().await;
        let cat = seed_category(&db, "AMBIENTES").await;
        let brand = seed_brand(&db, "MAKITA").await;
        seed_product_code(&db, "TAAMMA-1", cat, brand).await;

        let err = insert_with_generated_code(
            &db,
            CodeInput {
                name: "TALADRO",
                category_id: cat,
                brand_id: brand,
            },
            2,
            |_| product_row("TAAMMA-1".to_string(), cat, brand),
        )
        .await
        .unwrap_err();

        assert_matches!(err, ServiceError::UniquenessConflict(_));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn concurrent_creates_with_one_prefix_get_distinct_codes() {
        let db = migrated_memory_pool().await;
        let cat = seed_category(&db, "AMBIENTES").await;
        let brand = seed_brand(&db, "MAKITA").await;

        let mut handles = Vec::new();
        for _ in 0..4 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                insert_with_generated_code(
                    &db,
                    CodeInput {
                        name: "TALADRO",
                        category_id: cat,
                        brand_id: brand,
                    },
                    5,
                    |code| product_row(code, cat, brand),
                )
                .await
                .map(|row| row.code)
            }));
        }

        let mut codes = BTreeSet::new();
        for handle in handles {
            codes.insert(handle.await.unwrap().unwrap());
        }

        let expected: BTreeSet<String> = (1..=4).map(|n| format!("TAAMMA-{}", n)).collect();
        assert_eq!(codes, expected);
    }
}
