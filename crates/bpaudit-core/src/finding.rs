//! Findings: the unit of audit output.

use bpaudit_model::{Chunk, Endpoint, Locator, Page};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How badly a finding threatens a first-run test pass.
///
/// Ordered most severe first so that sorting ascending ranks blockers on top.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Generated tests will fail on first run.
    Blocking,
    /// Generated tests will probably fail on some render path or ordering.
    Likely,
    /// Worth knowing; will not break tests by itself.
    Advisory,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Blocking, Severity::Likely, Severity::Advisory];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blocking => "BLOCKING",
            Self::Likely => "LIKELY",
            Self::Advisory => "ADVISORY",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! categories {
    ($($variant:ident => $tag:literal, $severity:ident;)+) => {
        /// Defect taxonomy tag.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub enum Category {
            $(
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl Category {
            pub const ALL: &'static [Category] = &[$(Category::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $tag,)+
                }
            }

            /// Severity a finding of this category carries unless the rule
            /// says otherwise (MISSING_FIELD_EXAMPLE downgrades for
            /// optional fields).
            pub fn default_severity(self) -> Severity {
                match self {
                    $(Self::$variant => Severity::$severity,)+
                }
            }
        }
    };
}

categories! {
    // locator
    UnqualifiedRole => "UNQUALIFIED_ROLE", Blocking;
    DuplicateOnPage => "DUPLICATE_ON_PAGE", Blocking;
    DynamicListInteractive => "DYNAMIC_LIST_INTERACTIVE", Blocking;
    DynamicListView => "DYNAMIC_LIST_VIEW", Advisory;
    HeadingPartial => "HEADING_PARTIAL", Advisory;
    RoleMain => "ROLE_MAIN", Advisory;
    Conditional => "CONDITIONAL", Likely;
    LocatorNoCode => "LOCATOR_NO_CODE", Likely;
    LocatorUndefined => "LOCATOR_UNDEFINED", Blocking;
    LocatorNoPageRoot => "LOCATOR_NO_PAGE_ROOT", Blocking;
    LocatorDynamicSegment => "LOCATOR_DYNAMIC_SEGMENT", Blocking;
    UnknownStrategy => "UNKNOWN_STRATEGY", Advisory;
    BrittleLocator => "BRITTLE_LOCATOR", Advisory;
    // page
    NoLocators => "NO_LOCATORS", Likely;
    BadRoute => "BAD_ROUTE", Blocking;
    DynamicRouteNoParams => "DYNAMIC_ROUTE_NO_PARAMS", Likely;
    OrphanRouteParam => "ORPHAN_ROUTE_PARAM", Advisory;
    UndeclaredRouteParam => "UNDECLARED_ROUTE_PARAM", Likely;
    BadTitle => "BAD_TITLE", Blocking;
    FormFlowUnresolvedRef => "FORM_FLOW_UNRESOLVED_REF", Likely;
    DuplicatePageRoute => "DUPLICATE_PAGE_ROUTE", Blocking;
    // endpoint
    BodyBleed => "BODY_BLEED", Blocking;
    NoBody => "NO_BODY", Likely;
    EmptyBodyFields => "EMPTY_BODY_FIELDS", Likely;
    MissingFieldExample => "MISSING_FIELD_EXAMPLE", Blocking;
    FkNoExample => "FK_NO_EXAMPLE", Blocking;
    MissingPathParam => "MISSING_PP", Blocking;
    OrphanPathParam => "ORPHAN_PATH_PARAM", Blocking;
    PathParamNoExample => "PATH_PARAM_NO_EXAMPLE", Likely;
    BadMethod => "BAD_METHOD", Blocking;
    FieldNoType => "FIELD_NO_TYPE", Advisory;
    NoResponseSchema => "NO_RESPONSE_SCHEMA", Advisory;
    AuthTypeMissing => "AUTH_TYPE_MISSING", Advisory;
    PageRouteEndpoint => "PAGE_ROUTE_ENDPOINT", Advisory;
    DuplicateEndpoint => "DUPLICATE_ENDPOINT", Blocking;
    // shared by endpoints, pages and locators
    AuthFlagUnset => "AUTH_FLAG_UNSET", Advisory;
    LowConfidence => "LOW_CONFIDENCE", Advisory;
    // blueprint
    AuthIncomplete => "AUTH_INCOMPLETE", Blocking;
    NoSeedCreds => "NO_SEED_CREDS", Likely;
    NoTokenPath => "NO_TOKEN_PATH", Likely;
    // blueprint <-> chunks
    OrphanedEndpoint => "ORPHANED_ENDPOINT", Blocking;
    OrphanedPage => "ORPHANED_PAGE", Blocking;
    UnknownChunkEntity => "UNKNOWN_CHUNK_ENTITY", Advisory;
    EmptyChunk => "EMPTY_CHUNK", Advisory;
    PromptMissingSection => "PROMPT_MISSING_SECTION", Likely;
    PromptTooShort => "PROMPT_TOO_SHORT", Advisory;
    PromptNoSessionCookie => "PROMPT_NO_SESSION_COOKIE", Advisory;
    ChunkAuthMissing => "CHUNK_AUTH_MISSING", Likely;
    // blueprint <-> source
    MissingEndpoint => "MISSING_ENDPOINT", Blocking;
    PhantomEndpoint => "PHANTOM_ENDPOINT", Blocking;
    MissingQueryParam => "MISSING_QUERY_PARAM", Blocking;
    ExtraQueryParam => "EXTRA_QUERY_PARAM", Advisory;
    MissingBodyField => "MISSING_BODY_FIELD", Blocking;
    ExtraBodyField => "EXTRA_BODY_FIELD", Advisory;
    // foreign keys
    RequiredFkUnresolvable => "REQUIRED_FK_UNRESOLVABLE", Blocking;
    RequiredFkCrossChunk => "REQUIRED_FK_CROSS_CHUNK", Likely;
    OptionalFkUnresolved => "OPTIONAL_FK_UNRESOLVED", Advisory;
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Blueprint,
    Endpoint,
    Field,
    Page,
    Locator,
    Chunk,
    SourceRoute,
}

/// Points a finding back at the blueprint entity it concerns.
///
/// `id` is the stable sort key; `context` is what a reader searches for in
/// the blueprint (a path, a route, a locator name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
    pub context: String,
}

impl EntityRef {
    pub fn blueprint(section: &str) -> Self {
        Self {
            kind: EntityKind::Blueprint,
            id: format!("blueprint.{section}"),
            context: format!("BLUEPRINT {section}"),
        }
    }

    pub fn endpoint(ep: &Endpoint) -> Self {
        Self {
            kind: EntityKind::Endpoint,
            id: ep.id.clone(),
            context: ep.key(),
        }
    }

    pub fn field(ep: &Endpoint, field: &str) -> Self {
        Self {
            kind: EntityKind::Field,
            id: format!("{}#{field}", ep.id),
            context: format!("{} field={field}", ep.key()),
        }
    }

    pub fn page(page: &Page) -> Self {
        Self {
            kind: EntityKind::Page,
            id: page.id.clone(),
            context: format!("PAGE {}", page.route),
        }
    }

    pub fn locator(page: &Page, locator: &Locator) -> Self {
        Self {
            kind: EntityKind::Locator,
            id: format!("{}#{}", page.id, locator.name),
            context: format!("PAGE {} locator={}", page.route, locator.name),
        }
    }

    pub fn chunk(chunk: &Chunk) -> Self {
        Self {
            kind: EntityKind::Chunk,
            id: chunk.source.clone(),
            context: format!("CHUNK {}", chunk.source),
        }
    }

    pub fn source_route(method: &str, path: &str) -> Self {
        let key = format!("{method} {path}");
        Self {
            kind: EntityKind::SourceRoute,
            id: key.clone(),
            context: key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub entity_ref: EntityRef,
    pub category: Category,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    /// A finding at the category's default severity.
    pub fn new(entity_ref: EntityRef, category: Category, message: impl Into<String>) -> Self {
        Self {
            entity_ref,
            category,
            severity: category.default_severity(),
            message: message.into(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}
