use super::value_objects::GroupName;

/// A named set of users
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: i64,
    pub name: GroupName,
}

/// Data for a group that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewGroup {
    pub name: GroupName,
}
