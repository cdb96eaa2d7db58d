/// Catalog lookup failures.
///
/// A missing entry means content was removed without a data migration: a
/// fatal configuration error when hit at load time, reported (never silently
/// defaulted) and skipped entry-by-entry when applying persisted records.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no skill descriptor for id {0:#x}")]
    MissingSkill(u64),

    #[error("no buff descriptor for id {0:#x}")]
    MissingBuff(u64),

    #[error("no actor template named '{0}'")]
    MissingTemplate(String),

    #[error("template '{0}' lists more skills than an actor can carry")]
    TemplateTooLarge(String),
}
