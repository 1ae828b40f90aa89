//! Conversion from coordinator snapshots to HTTP DTOs.

use irori_shared::time::millis_to_rfc3339;

use crate::{
    infrastructure::dto::http::{MemberDetailDto, RoomDetailDto, RoomSummaryDto},
    usecase::{MemberSnapshot, RoomSnapshot},
};

impl From<RoomSnapshot> for RoomSummaryDto {
    fn from(room: RoomSnapshot) -> Self {
        Self {
            name: room.name.into_string(),
            members: room
                .members
                .into_iter()
                .map(|member| member.identity.into_string())
                .collect(),
            created_at: millis_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<MemberSnapshot> for MemberDetailDto {
    fn from(member: MemberSnapshot) -> Self {
        Self {
            identity: member.identity.into_string(),
            connection: member.key.to_string(),
            joined_at: millis_to_rfc3339(member.joined_at.value()),
        }
    }
}

impl From<RoomSnapshot> for RoomDetailDto {
    fn from(room: RoomSnapshot) -> Self {
        Self {
            name: room.name.into_string(),
            members: room.members.into_iter().map(Into::into).collect(),
            created_at: millis_to_rfc3339(room.created_at.value()),
        }
    }
}
