use super::config::SegmentKey;
use super::domain::{AreaGroup, FeedbackRecord};

/// Ordered substring rules applied to the lower-cased area text. First match wins.
const AREA_RULES: &[(&[&str], AreaGroup)] = &[
    (&["caja"], AreaGroup::Cashiers),
    (&["atención", "atencion"], AreaGroup::CustomerService),
    (&["rest"], AreaGroup::Restaurants),
    (&["auto"], AreaGroup::SelfService),
    (&["baño", "bano"], AreaGroup::Restrooms),
    (&["traslado"], AreaGroup::Transfers),
];

const UNNAMED_SEGMENT: &str = "Sin sector";

/// Assigns the area group. A VIP marker in the room/hall column overrides the area rules.
pub fn classify_group(area: &str, room: &str, vip_marker: &str) -> AreaGroup {
    let marker = vip_marker.trim().to_lowercase();
    if !marker.is_empty() && room.to_lowercase().contains(&marker) {
        return AreaGroup::Vip;
    }

    let area = area.to_lowercase();
    AREA_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| area.contains(needle)))
        .map(|(_, group)| *group)
        .unwrap_or(AreaGroup::Other)
}

/// Title of the second-level segment a record belongs to inside its group.
pub fn segment_title(record: &FeedbackRecord, key: SegmentKey) -> String {
    let area = record.area.trim();
    let area = if area.is_empty() { UNNAMED_SEGMENT } else { area };

    match (key, record.location.as_deref().map(str::trim)) {
        (SegmentKey::AreaAndLocation, Some(location)) if !location.is_empty() => {
            format!("{area} - {location}")
        }
        _ => area.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn record(area: &str, location: Option<&str>) -> FeedbackRecord {
        FeedbackRecord {
            timestamp: NaiveDate::from_ymd_opt(2025, 3, 1)
                .expect("valid date")
                .and_hms_opt(10, 0, 0)
                .expect("valid time"),
            comment: None,
            rating: None,
            area: area.to_string(),
            room: "Sala 1".to_string(),
            location: location.map(str::to_string),
            critical_point: None,
            highlight: None,
        }
    }

    #[test]
    fn vip_room_wins_over_restroom_area() {
        assert_eq!(classify_group("Baño VIP", "Sala VIP", "VIP"), AreaGroup::Vip);
        assert_eq!(classify_group("Baño Planta Alta", "Sala 2", "VIP"), AreaGroup::Restrooms);
    }

    #[test]
    fn vip_marker_is_case_insensitive() {
        assert_eq!(classify_group("Cajas", "sala vip norte", "VIP"), AreaGroup::Vip);
    }

    #[test]
    fn first_matching_rule_wins() {
        // "caja" is tested before "rest"
        assert_eq!(classify_group("Caja Restaurante", "", "VIP"), AreaGroup::Cashiers);
        assert_eq!(
            classify_group("ATENCIÓN AL CLIENTE", "", "VIP"),
            AreaGroup::CustomerService
        );
        assert_eq!(classify_group("Restó Central", "", "VIP"), AreaGroup::Restaurants);
        assert_eq!(classify_group("Autoservicio 3", "", "VIP"), AreaGroup::SelfService);
        assert_eq!(classify_group("BAÑOS", "", "VIP"), AreaGroup::Restrooms);
        assert_eq!(classify_group("Traslados Hotel", "", "VIP"), AreaGroup::Transfers);
    }

    #[test]
    fn unmatched_area_lands_in_other() {
        assert_eq!(classify_group("Estacionamiento", "Sala 1", "VIP"), AreaGroup::Other);
        assert_eq!(classify_group("", "", "VIP"), AreaGroup::Other);
    }

    #[test]
    fn segment_title_can_include_location() {
        let entry = record("Cajas", Some("Puesto 4"));
        assert_eq!(segment_title(&entry, SegmentKey::Area), "Cajas");
        assert_eq!(
            segment_title(&entry, SegmentKey::AreaAndLocation),
            "Cajas - Puesto 4"
        );
        assert_eq!(
            segment_title(&record("  ", None), SegmentKey::AreaAndLocation),
            "Sin sector"
        );
    }

    proptest! {
        #[test]
        fn any_vip_room_is_assigned_vip(area in ".*", prefix in "[a-z ]{0,8}", suffix in "[a-z ]{0,8}") {
            let room = format!("{prefix}VIP{suffix}");
            prop_assert_eq!(classify_group(&area, &room, "VIP"), AreaGroup::Vip);
        }

        #[test]
        fn every_area_maps_to_a_canonical_group(area in ".*", room in "[a-z0-9 ]{0,12}") {
            let group = classify_group(&area, &room, "VIP");
            prop_assert!(AreaGroup::ordered().contains(&group));
        }
    }
}
