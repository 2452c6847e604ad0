//! Well-known concept keys used by relationship handling

use uuid::Uuid;

/// Relationship type concepts
pub mod relationship_types {
    use super::Uuid;

    pub const PARENT: Uuid = Uuid::from_u128(0xbfcbb345_86db_43ba_b47e_e7411276ac7c);
    pub const CHILD: Uuid = Uuid::from_u128(0x739457d0_835a_4a9c_811c_42b5e92ed1ca);
    pub const DEDICATED_SERVICE_DELIVERY_LOCATION: Uuid =
        Uuid::from_u128(0x455f1772_f580_47e8_86bd_b5ce25d351f9);
    pub const OWNED_ENTITY: Uuid = Uuid::from_u128(0x117da15c_0864_4f00_a987_9b9854cba44e);
    pub const MANUFACTURED_PRODUCT: Uuid =
        Uuid::from_u128(0x6780df3b_afbd_44a3_8627_cbb3dc2f02f6);
    pub const INSTANCE: Uuid = Uuid::from_u128(0xac45a740_b0c7_4425_84d8_b3f8a41fef9f);
}

/// Entity class concepts
pub mod entity_classes {
    use super::Uuid;

    pub const SERVICE_DELIVERY_LOCATION: Uuid =
        Uuid::from_u128(0xff34dfa7_c6d3_4f8b_bc9f_14bcdc13ba6c);
    pub const PLACE: Uuid = Uuid::from_u128(0x21ab7873_8ef3_4d78_9c19_4582b3c40631);
}
