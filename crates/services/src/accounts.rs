//! Account-level operations: the buyer's address book and profile, and
//! seller onboarding.

use common::{AddressId, SellerId, UserId};
use domain::{
    AddressBook, AddressBookEvent, AddressPatch, BuyerProfile, DocumentKind, PostalAddress,
    ProfilePatch, SellerApplication, SellerProfile, SellerProfileEvent, UnitOfWork, UserAddress,
};
use event_store::{EventEnvelope, EventStore};

use crate::collaborators::{Principal, StoredBlob};
use crate::error::{Result, ServiceError};
use crate::storefront::Storefront;

/// A new delivery address.
#[derive(Debug, Clone, Default)]
pub struct NewAddress {
    pub address: PostalAddress,
    pub is_default: bool,
}

/// Resolves the caller's seller id, failing unless they are approved.
pub(crate) async fn approved_seller<S: EventStore + ?Sized>(
    uow: &mut UnitOfWork<'_, S>,
    principal: Principal,
) -> Result<SellerId> {
    let profile: SellerProfile = uow.load(principal.user_id).await?;
    Ok(profile.ensure_approved()?)
}

impl<S: EventStore + Clone + 'static> Storefront<S> {
    /// The caller's addresses, default first.
    #[tracing::instrument(skip(self), fields(user = %principal.user_id))]
    pub async fn addresses(&self, principal: Principal) -> Result<Vec<UserAddress>> {
        let book: AddressBook = self.read(principal.user_id).await?;
        Ok(book.list())
    }

    #[tracing::instrument(skip(self, new), fields(user = %principal.user_id))]
    pub async fn add_address(&self, principal: Principal, new: NewAddress) -> Result<UserAddress> {
        let address_id = AddressId::new();
        let book = self
            .execute("add_address", || {
                self.change_addresses(principal, |book| {
                    Ok(book.add(
                        principal.user_id,
                        address_id,
                        new.address.clone(),
                        new.is_default,
                    ))
                })
            })
            .await?;
        stored(&book, address_id)
    }

    /// Merges `patch` into one of the caller's addresses.
    #[tracing::instrument(skip(self, patch), fields(user = %principal.user_id))]
    pub async fn update_address(
        &self,
        principal: Principal,
        address_id: AddressId,
        patch: AddressPatch,
    ) -> Result<UserAddress> {
        let book = self
            .execute("update_address", || {
                self.change_addresses(principal, |book| Ok(book.update(address_id, &patch)?))
            })
            .await?;
        stored(&book, address_id)
    }

    #[tracing::instrument(skip(self), fields(user = %principal.user_id))]
    pub async fn remove_address(&self, principal: Principal, address_id: AddressId) -> Result<()> {
        self.execute("remove_address", || {
            self.change_addresses(principal, |book| Ok(book.remove(address_id)?))
        })
        .await?;
        Ok(())
    }

    async fn change_addresses<F>(
        &self,
        principal: Principal,
        change: F,
    ) -> Result<(AddressBook, Vec<EventEnvelope>)>
    where
        F: FnOnce(&AddressBook) -> Result<Vec<AddressBookEvent>>,
    {
        let mut uow = UnitOfWork::new(&self.store);
        let mut book: AddressBook = uow.load(principal.user_id).await?;
        let events = change(&book)?;
        uow.record(&mut book, events)?;

        let committed = uow.commit().await?;
        Ok((book, committed))
    }

    /// The caller's buyer profile; empty until first updated.
    #[tracing::instrument(skip(self), fields(user = %principal.user_id))]
    pub async fn buyer_profile(&self, principal: Principal) -> Result<BuyerProfile> {
        self.read(principal.user_id).await
    }

    /// Merges the non-blank fields of `patch` into the caller's profile.
    #[tracing::instrument(skip(self, patch), fields(user = %principal.user_id))]
    pub async fn update_buyer_profile(
        &self,
        principal: Principal,
        patch: ProfilePatch,
    ) -> Result<BuyerProfile> {
        self.execute("update_buyer_profile", || {
            self.try_update_buyer_profile(principal, &patch)
        })
        .await
    }

    async fn try_update_buyer_profile(
        &self,
        principal: Principal,
        patch: &ProfilePatch,
    ) -> Result<(BuyerProfile, Vec<EventEnvelope>)> {
        let mut uow = UnitOfWork::new(&self.store);
        let mut profile: BuyerProfile = uow.load(principal.user_id).await?;
        let events = profile.update(principal.user_id, patch);
        uow.record(&mut profile, events)?;

        let committed = uow.commit().await?;
        Ok((profile, committed))
    }

    /// The caller's seller profile. Callers that never applied get an empty
    /// profile.
    #[tracing::instrument(skip(self), fields(user = %principal.user_id))]
    pub async fn seller_profile(&self, principal: Principal) -> Result<SellerProfile> {
        self.read(principal.user_id).await
    }

    /// Submits or resubmits the caller's seller application.
    #[tracing::instrument(skip(self, application), fields(user = %principal.user_id))]
    pub async fn apply_as_seller(
        &self,
        principal: Principal,
        application: SellerApplication,
    ) -> Result<SellerProfile> {
        let profile = self
            .execute("apply_as_seller", || {
                self.change_profile(principal.user_id, |profile| {
                    Ok(profile.apply_for(principal.user_id, application.clone())?)
                })
            })
            .await?;
        tracing::info!(shop_name = profile.shop_name(), "seller application submitted");
        Ok(profile)
    }

    /// Uploads one identity document and returns where it is stored. The
    /// URL goes into a later application.
    #[tracing::instrument(skip(self, bytes), fields(user = %principal.user_id, kind = kind.as_str()))]
    pub async fn upload_seller_document(
        &self,
        principal: Principal,
        kind: DocumentKind,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredBlob> {
        let folder = format!("seller-docs/{}", principal.user_id);
        let blob = self.blobs.upload(bytes, content_type, &folder).await?;
        tracing::info!(url = %blob.url, "seller document uploaded");
        Ok(blob)
    }

    /// Approves `user_id`'s application. Administrators only.
    #[tracing::instrument(skip(self), fields(admin = %principal.user_id))]
    pub async fn approve_seller(&self, principal: Principal, user_id: UserId) -> Result<SellerProfile> {
        if !principal.is_admin() {
            return Err(ServiceError::forbidden("Administrator access required"));
        }
        let profile = self
            .execute("approve_seller", || {
                self.change_profile(user_id, |profile| Ok(profile.approve(principal.user_id)?))
            })
            .await?;
        tracing::info!(%user_id, "seller approved");
        Ok(profile)
    }

    async fn change_profile<F>(
        &self,
        user_id: UserId,
        change: F,
    ) -> Result<(SellerProfile, Vec<EventEnvelope>)>
    where
        F: FnOnce(&SellerProfile) -> Result<Vec<SellerProfileEvent>>,
    {
        let mut uow = UnitOfWork::new(&self.store);
        let mut profile: SellerProfile = uow.load(user_id).await?;
        let events = change(&profile)?;
        uow.record(&mut profile, events)?;

        let committed = uow.commit().await?;
        Ok((profile, committed))
    }
}

fn stored(book: &AddressBook, address_id: AddressId) -> Result<UserAddress> {
    book.get(address_id)
        .ok_or_else(|| ServiceError::Internal(format!("address {address_id} missing after commit")))
}
