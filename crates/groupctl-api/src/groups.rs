// Group endpoints
//
// One method per service operation. Host groups and template groups share
// every endpoint shape; the collection only changes the path segment and
// the member field name.

use tracing::debug;

use crate::client::GroupServiceClient;
use crate::error::Error;
use crate::types::{
    CreateGroupBody, GetQuery, GroupCollection, GroupPatchBody, GroupRecord, MassMembersBody,
    MassPatchBody, MemberIds, MutationResult, UpdateGroupBody,
};

impl GroupServiceClient {
    /// List groups matching `query`.
    ///
    /// `POST .../{collection}/get`
    pub async fn list_groups(
        &self,
        project: &str,
        collection: GroupCollection,
        query: &GetQuery,
    ) -> Result<Vec<GroupRecord>, Error> {
        let url = self.endpoint(project, collection, "get")?;
        debug!(project, ?collection, "listing groups");
        self.call(url, query).await
    }

    /// Create a group and return the stored record.
    ///
    /// `POST .../{collection}/create`
    pub async fn create_group(
        &self,
        project: &str,
        collection: GroupCollection,
        body: &CreateGroupBody,
    ) -> Result<GroupRecord, Error> {
        let url = self.endpoint(project, collection, "create")?;
        debug!(project, ?collection, name = %body.name, "creating group");
        self.call(url, body).await
    }

    /// Update a single group and return the stored record.
    ///
    /// `POST .../{collection}/update` with `{"id": ..., <patch>}`
    pub async fn update_group(
        &self,
        project: &str,
        collection: GroupCollection,
        id: &str,
        patch: &GroupPatchBody,
    ) -> Result<GroupRecord, Error> {
        let url = self.endpoint(project, collection, "update")?;
        debug!(project, ?collection, id, "updating group");
        let body = UpdateGroupBody {
            id: id.to_owned(),
            patch: patch.clone(),
        };
        self.call(url, &body).await
    }

    /// Delete groups by id.
    ///
    /// `POST .../{collection}/delete` with a bare JSON array of ids.
    pub async fn delete_groups(
        &self,
        project: &str,
        collection: GroupCollection,
        ids: &[String],
    ) -> Result<MutationResult, Error> {
        let url = self.endpoint(project, collection, "delete")?;
        debug!(project, ?collection, count = ids.len(), "deleting groups");
        self.call(url, ids).await
    }

    /// Link members to every group in `ids`.
    ///
    /// `POST .../{collection}/massadd`
    pub async fn mass_add(
        &self,
        project: &str,
        collection: GroupCollection,
        ids: &[String],
        member_ids: &[String],
    ) -> Result<MutationResult, Error> {
        let url = self.endpoint(project, collection, "massadd")?;
        debug!(
            project,
            ?collection,
            groups = ids.len(),
            members = member_ids.len(),
            "mass-adding members"
        );
        let body = MassMembersBody {
            groupids: ids.to_vec(),
            members: MemberIds::for_collection(collection, member_ids.to_vec()),
        };
        self.call(url, &body).await
    }

    /// Unlink members from every group in `ids`.
    ///
    /// `POST .../{collection}/massremove`
    pub async fn mass_remove(
        &self,
        project: &str,
        collection: GroupCollection,
        ids: &[String],
        member_ids: &[String],
    ) -> Result<MutationResult, Error> {
        let url = self.endpoint(project, collection, "massremove")?;
        debug!(
            project,
            ?collection,
            groups = ids.len(),
            members = member_ids.len(),
            "mass-removing members"
        );
        let body = MassMembersBody {
            groupids: ids.to_vec(),
            members: MemberIds::for_collection(collection, member_ids.to_vec()),
        };
        self.call(url, &body).await
    }

    /// Apply one patch to every group in `ids`.
    ///
    /// `POST .../{collection}/massupdate`
    pub async fn mass_update(
        &self,
        project: &str,
        collection: GroupCollection,
        ids: &[String],
        patch: &GroupPatchBody,
    ) -> Result<MutationResult, Error> {
        let url = self.endpoint(project, collection, "massupdate")?;
        debug!(project, ?collection, count = ids.len(), "mass-updating groups");
        let body = MassPatchBody {
            ids: ids.to_vec(),
            patch: patch.clone(),
        };
        self.call(url, &body).await
    }

    /// Push a permission patch onto `ids` and their subgroups.
    ///
    /// `POST .../{collection}/propagate`
    pub async fn propagate(
        &self,
        project: &str,
        collection: GroupCollection,
        ids: &[String],
        permissions: &[String],
    ) -> Result<MutationResult, Error> {
        let url = self.endpoint(project, collection, "propagate")?;
        debug!(project, ?collection, count = ids.len(), "propagating permissions");
        let body = MassPatchBody {
            ids: ids.to_vec(),
            patch: GroupPatchBody {
                permissions: Some(permissions.to_vec()),
                ..GroupPatchBody::default()
            },
        };
        self.call(url, &body).await
    }
}
