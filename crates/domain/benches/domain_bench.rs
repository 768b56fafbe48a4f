use common::{AccountId, CallerContext, Money, ProductId, Role};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{AccessPolicy, LineItemRequest, OrderService, PriceAuthority};
use store::{
    AccountStore, CatalogStore, InMemoryStore, NewAccount, NewCategory, NewProduct,
    ShippingAddress,
};

fn address() -> ShippingAddress {
    ShippingAddress {
        address_line1: "1 Bench Way".to_string(),
        address_line2: None,
        postal_code: "00000".to_string(),
        city: "Benchville".to_string(),
        country: "US".to_string(),
        notes: None,
    }
}

/// Seeds one customer and `products` products priced 1..=products dollars.
fn seed(rt: &tokio::runtime::Runtime, products: i64) -> (InMemoryStore, AccountId) {
    rt.block_on(async {
        let store = InMemoryStore::new();
        let account = store
            .create_account(NewAccount {
                email: "bench@example.com".to_string(),
                password_hash: "unused".to_string(),
                role: Role::Customer,
                first_name: "Bench".to_string(),
                last_name: None,
            })
            .await
            .unwrap();
        let category = store
            .create_category(NewCategory {
                name: "Bench".to_string(),
            })
            .await
            .unwrap();
        for n in 1..=products {
            store
                .create_product(NewProduct {
                    name: format!("Product {n}"),
                    description: String::new(),
                    price: Money::from_cents(100 * n),
                    category_id: category.id,
                })
                .await
                .unwrap();
        }
        (store, account.id)
    })
}

fn lines(count: i64) -> Vec<LineItemRequest> {
    (1..=count)
        .map(|n| LineItemRequest {
            product_id: ProductId::new(n),
            quantity: 1,
            shipping: address(),
        })
        .collect()
}

fn bench_resolve_prices(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (store, _) = seed(&rt, 50);
    let authority = PriceAuthority::new(store);
    let ids: Vec<ProductId> = (1..=50).map(ProductId::new).collect();

    c.bench_function("domain/resolve_50_prices", |b| {
        b.iter(|| {
            rt.block_on(async {
                authority.resolve(ids.iter().copied()).await.unwrap();
            });
        });
    });
}

fn bench_place_single_item(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (store, account_id) = seed(&rt, 1);
    let service = OrderService::new(store, AccessPolicy::default());
    let caller = CallerContext::new(account_id, Role::Customer);

    c.bench_function("domain/place_1_item", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.place_order(&caller, lines(1)).await.unwrap();
            });
        });
    });
}

fn bench_place_many_items(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (store, account_id) = seed(&rt, 20);
    let service = OrderService::new(store, AccessPolicy::default());
    let caller = CallerContext::new(account_id, Role::Customer);

    c.bench_function("domain/place_20_items", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.place_order(&caller, lines(20)).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_resolve_prices,
    bench_place_single_item,
    bench_place_many_items,
);
criterion_main!(benches);
