use diesel::prelude::*;

use crate::domain::pickup::{PickupPoint, UserAddress};
use crate::domain::types::{AddressId, PickupPointId, UserId};
use crate::models::pickup::{PickupPoint as DbPickupPoint, UserAddress as DbUserAddress};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, PickupReader};

impl PickupReader for DieselRepository {
    fn get_pickup_point_by_id(
        &self,
        id: PickupPointId,
    ) -> RepositoryResult<Option<PickupPoint>> {
        use crate::schema::pickup_points;

        let mut conn = self.conn()?;

        let point = pickup_points::table
            .filter(pickup_points::id.eq(id.get()))
            .first::<DbPickupPoint>(&mut conn)
            .optional()?;

        Ok(point.map(TryInto::try_into).transpose()?)
    }

    fn list_pickup_points(&self) -> RepositoryResult<Vec<PickupPoint>> {
        use crate::schema::pickup_points;

        let mut conn = self.conn()?;

        let points = pickup_points::table
            .filter(pickup_points::is_active.eq(true))
            .order((pickup_points::city.asc(), pickup_points::street.asc()))
            .load::<DbPickupPoint>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<PickupPoint>, _>>()?;

        Ok(points)
    }

    fn get_user_address(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> RepositoryResult<Option<UserAddress>> {
        use crate::schema::user_addresses;

        let mut conn = self.conn()?;

        let address = user_addresses::table
            .filter(user_addresses::id.eq(id.get()))
            .filter(user_addresses::user_id.eq(user_id.get()))
            .first::<DbUserAddress>(&mut conn)
            .optional()?;

        Ok(address.map(TryInto::try_into).transpose()?)
    }
}
