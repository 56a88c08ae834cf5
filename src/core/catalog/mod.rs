// ─── Mod catalog ───
// Client for the Modrinth v2 REST API: search, project lookups, version
// resolution and file downloads. Network failures never propagate out of
// the lookup calls; they are logged and reported as empty results.

pub mod client;
pub mod model;

pub use client::{mod_page_url, search_params, ModrinthClient, MODRINTH_API_URL};
pub use model::{FileHashes, Project, ProjectVersion, SearchHit, SortIndex, VersionFile};
