// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Property tests for the mapper ordering rule (testable property 4) and
//! the attribute validator's totality (testable property 5), run against
//! randomly generated hit counts / numeric payloads rather than hand-picked
//! examples.

use proptest::prelude::*;
use slidetap_domain::attribute::{Attribute, AttributeEngine, AttributeValue};
use slidetap_domain::mapper::{Mapper, MapperEngine, MappingItem};
use slidetap_domain::schema::{AttributeSchema, AttributeSchemaVariant};
use slidetap_domain::validator::validate_attribute;
use slidetap_domain::value_objects::AttributeSchemaUid;

fn string_schema() -> AttributeSchema {
    AttributeSchema::new(AttributeSchemaUid::new(), "collection", false, AttributeSchemaVariant::String)
}

fn mapping_item_with_hits(engine: &AttributeEngine, schema: &AttributeSchema, label: &str, hits: u64) -> MappingItem {
    let replacement = engine.build(schema, Some(AttributeValue::String(label.to_string()))).unwrap();
    let mut item = MappingItem::new("^Excision$", replacement);
    item.hits = hits;
    item
}

proptest! {
    /// Whichever mapping item has the highest hit count wins, regardless
    /// of where it sits among items that all match; ties resolve to the
    /// earliest-inserted item (testable property 4).
    #[test]
    fn highest_hits_always_wins_regardless_of_position(hit_counts in prop::collection::vec(0u64..50, 1..8)) {
        let schema = string_schema();
        let attribute_engine = AttributeEngine::new();
        let mut mapper = Mapper::new("collection", schema.uid.clone(), schema.uid.clone());
        for (i, hits) in hit_counts.iter().enumerate() {
            mapper.add_mapping_item(mapping_item_with_hits(&attribute_engine, &schema, &format!("item-{i}"), *hits));
        }

        let max_hits = *hit_counts.iter().max().unwrap();
        let expected_idx = hit_counts.iter().position(|h| *h == max_hits).unwrap();

        let mapper_engine = MapperEngine::new();
        let mut attr = attribute_engine.build_mappable(&schema, "Excision");
        mapper_engine.apply_mapper(&mut mapper, &mut attr).unwrap();

        prop_assert_eq!(
            attr.mapped_value,
            Some(AttributeValue::String(format!("item-{expected_idx}")))
        );
    }

    /// Re-applying the winning mapping item never changes the substituted
    /// value, and the item's hit counter advances by exactly one each
    /// call (testable property 3, generalized over arbitrary starting
    /// hit counts).
    #[test]
    fn reapplying_a_match_is_idempotent_on_value(starting_hits in 0u64..1000, rounds in 1usize..5) {
        let schema = string_schema();
        let attribute_engine = AttributeEngine::new();
        let mut mapper = Mapper::new("collection", schema.uid.clone(), schema.uid.clone());
        mapper.add_mapping_item(mapping_item_with_hits(&attribute_engine, &schema, "Excision", starting_hits));

        let mapper_engine = MapperEngine::new();
        let mut attr = attribute_engine.build_mappable(&schema, "Excision");

        mapper_engine.apply_mapper(&mut mapper, &mut attr).unwrap();
        let first_value = attr.mapped_value.clone();

        for _ in 1..rounds {
            mapper_engine.apply_mapper(&mut mapper, &mut attr).unwrap();
            prop_assert_eq!(&attr.mapped_value, &first_value);
        }

        prop_assert_eq!(mapper.mapping_items[0].hits, starting_hits + rounds as u64);
    }

    /// `validate_attribute` is total over a numeric schema: it terminates
    /// and its verdict always matches the direct range/integer check,
    /// for any combination of bounds and payload (testable property 5).
    #[test]
    fn numeric_validation_matches_its_range_definition(
        value in -10_000.0f64..10_000.0,
        min in -10_000.0f64..0.0,
        max in 0.0f64..10_000.0,
        is_integer in any::<bool>(),
    ) {
        let schema = AttributeSchema::new(
            AttributeSchemaUid::new(),
            "measurement",
            false,
            AttributeSchemaVariant::Numeric { is_integer, min: Some(min), max: Some(max) },
        );
        let engine = AttributeEngine::new();
        let attr: Attribute = engine.build(&schema, Some(AttributeValue::Numeric(value))).unwrap();

        let expected = value >= min && value <= max && (!is_integer || value.fract() == 0.0);
        prop_assert_eq!(validate_attribute(&schema, &attr), expected);
    }
}
