use crate::car::{Car, FuelType, OwnerSummary, Transmission};
use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use uuid::Uuid;

/// Repository trait for fleet data access
#[async_trait]
pub trait CarRepository: Send + Sync {
    async fn list_cars(&self) -> Result<Vec<Car>, Box<dyn Error + Send + Sync>>;

    async fn get_car(&self, id: Uuid) -> Result<Option<Car>, Box<dyn Error + Send + Sync>>;
}

/// In-memory fleet, seeded at startup. Listing management lives with the
/// owners' platform; the booking engine only reads.
pub struct InMemoryCarRepository {
    cars: HashMap<Uuid, Car>,
    order: Vec<Uuid>,
}

impl InMemoryCarRepository {
    pub fn new(cars: Vec<Car>) -> Self {
        let order: Vec<Uuid> = cars.iter().map(|c| c.id).collect();
        let cars = cars.into_iter().map(|c| (c.id, c)).collect();
        Self { cars, order }
    }

    /// The demo fleet used when no external catalog is wired up.
    pub fn seeded() -> Self {
        let owner_a = OwnerSummary {
            id: "owner-wanjiku".to_string(),
            name: "Grace Wanjiku".to_string(),
        };
        let owner_b = OwnerSummary {
            id: "owner-otieno".to_string(),
            name: "Brian Otieno".to_string(),
        };

        Self::new(vec![
            Car::new("Toyota Axio", 3500.0, 5, FuelType::Petrol, Transmission::Automatic, owner_a.clone()),
            Car::new("Mazda Demio", 3000.0, 5, FuelType::Petrol, Transmission::Automatic, owner_a.clone()),
            Car::new("Subaru Forester", 6500.0, 5, FuelType::Petrol, Transmission::Automatic, owner_b.clone()),
            Car::new("Mazda CX-5", 7500.0, 5, FuelType::Petrol, Transmission::Automatic, owner_b.clone()),
            Car::new("Toyota Land Cruiser Prado", 12000.0, 7, FuelType::Diesel, Transmission::Automatic, owner_a),
            Car::new("Land Rover Defender", 15000.0, 5, FuelType::Diesel, Transmission::Manual, owner_b),
        ])
    }
}

#[async_trait]
impl CarRepository for InMemoryCarRepository {
    async fn list_cars(&self) -> Result<Vec<Car>, Box<dyn Error + Send + Sync>> {
        Ok(self
            .order
            .iter()
            .filter_map(|id| self.cars.get(id))
            .filter(|c| c.is_active)
            .cloned()
            .collect())
    }

    async fn get_car(&self, id: Uuid) -> Result<Option<Car>, Box<dyn Error + Send + Sync>> {
        Ok(self.cars.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_fleet_lists_in_insertion_order() {
        let repo = InMemoryCarRepository::seeded();
        let cars = repo.list_cars().await.unwrap();
        assert_eq!(cars.len(), 6);
        assert_eq!(cars[0].name, "Toyota Axio");
        assert_eq!(cars[5].name, "Land Rover Defender");
    }

    #[tokio::test]
    async fn test_get_car_by_id() {
        let repo = InMemoryCarRepository::seeded();
        let cars = repo.list_cars().await.unwrap();
        let found = repo.get_car(cars[2].id).await.unwrap();
        assert_eq!(found.unwrap().name, "Subaru Forester");
    }
}
