//! OpenAPI documentation configuration
//!
//! Generates the OpenAPI 3 document served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::handlers::{HealthResponse, ReadyResponse, RevokeResponse, StatsResponse};

/// Ad-creative DNA API - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ad-Creative DNA API",
        version = "0.1.0",
        description = r#"
## Tamper-evident fingerprints for advertising creatives

Each registered creative gets a **DNA token**: a SHA3-256 digest of its
perceptual hash, dominant color palette, dimensions, MIME type and brand rule
version. Brand compliance (color rule and text safe zone) is recorded at
issuance.

### How It Works

1. **Issue** a certificate for the approved creative via `POST /generate-dna`
2. **Verify** a displayed creative via `POST /verify`, or look up a token via `GET /verify-dna`
3. The outcome is `valid`, `tampered` (modified derivative), `unregistered` or `revoked`
4. **Revoke** a certificate via `DELETE /remove-dna/{dna}`
"#,
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "Issuance", description = "Register and revoke creatives"),
        (name = "Verification", description = "Classify creatives against the registry"),
        (name = "Registry", description = "Registry statistics"),
        (name = "Health", description = "Service health and readiness endpoints")
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::issue::issue_handler,
        crate::handlers::verify::verify_handler,
        crate::handlers::verify::verify_dna_handler,
        crate::handlers::revoke::revoke_handler,
        crate::handlers::stats::stats_handler,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            RevokeResponse,
            StatsResponse,
        )
    )
)]
pub struct ApiDoc;
