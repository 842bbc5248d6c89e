//! Response schemas for the structured features.
//!
//! Features not listed here (analysis, song idea, costs) rely on the shape
//! described inline in their prompt.

use crate::ai::Schema;

pub fn producers() -> Schema {
    Schema::array_of(
        Schema::object()
            .required_property("name", Schema::string())
            .required_property(
                "specialty",
                Schema::string().describe("The producer's primary music genre."),
            )
            .required_property("city", Schema::string())
            .required_property(
                "bio",
                Schema::string().describe("A short, professional biography."),
            )
            .required_property(
                "relevanceScore",
                Schema::integer().describe("A score from 0 to 100 indicating relevance."),
            ),
    )
}

pub fn query_classification() -> Schema {
    Schema::object()
        .required_property(
            "type",
            Schema::string_enum(["general_search", "provider_search"]),
        )
        .required_property(
            "providerType",
            Schema::string_enum(["stores", "studios", "none"]),
        )
        .required_property("searchQuery", Schema::string())
}

pub fn semantic_search() -> Schema {
    Schema::array_of(
        Schema::object()
            .required_property("title", Schema::string())
            .required_property("description", Schema::string())
            .required_property("targetPage", Schema::string()),
    )
}

pub fn local_providers() -> Schema {
    Schema::array_of(
        Schema::object()
            .required_property("id", Schema::string())
            .required_property("type", Schema::string())
            .required_property("name", Schema::string())
            .required_property("description", Schema::string())
            .property("services", Schema::array_of(Schema::string()))
            .property("specialty", Schema::string())
            .required_property("address", Schema::string())
            .required_property("phone", Schema::string())
            .required_property("website", Schema::string())
            .required_property("whatsapp", Schema::string())
            .required_property("distance", Schema::string()),
    )
}
