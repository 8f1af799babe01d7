//! Demo-data loader for local development. Every insert is keyed on a natural
//! unique (or pre-checked), so reruns are no-ops.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::password::hash_password;

struct DemoRecipe {
    title: &'static str,
    description: &'static str,
    ingredients: &'static str,
    instructions: &'static str,
    prep_time: i32,
    cook_time: i32,
    servings: i32,
    category: &'static str,
}

pub async fn seed_demo_data(db: &PgPool) -> anyhow::Result<()> {
    info!("seeding demo data");

    // One hash shared by both demo accounts keeps startup fast.
    let password_hash = hash_password("password123")?;
    let john = ensure_user(db, "johndoe", "john@example.com", &password_hash).await?;
    let jane = ensure_user(db, "janedoe", "jane@example.com", &password_hash).await?;

    let pancakes = ensure_recipe(
        db,
        john,
        DemoRecipe {
            title: "Classic Pancakes",
            description: "Fluffy and delicious pancakes for a perfect breakfast.",
            ingredients: "1 cup all-purpose flour\n1/4 cup sugar\n1 tablespoon baking powder\n1/2 teaspoon salt\n1 cup milk\n1 large egg\n2 tablespoons vegetable oil",
            instructions: "1. Whisk together dry ingredients.\n2. Add wet ingredients; mix.\n3. Cook on a hot griddle until golden.",
            prep_time: 10,
            cook_time: 15,
            servings: 4,
            category: "Breakfast",
        },
    )
    .await?;

    let carbonara = ensure_recipe(
        db,
        jane,
        DemoRecipe {
            title: "Spaghetti Carbonara",
            description: "Roman classic with eggs, cheese, and cured pork.",
            ingredients: "400g spaghetti\n150g guanciale\n4 egg yolks\n100g pecorino romano\nblack pepper",
            instructions: "1. Boil the pasta.\n2. Render the guanciale.\n3. Toss off heat with the egg and cheese mixture.",
            prep_time: 10,
            cook_time: 20,
            servings: 4,
            category: "Dinner",
        },
    )
    .await?;

    let brownies = ensure_recipe(
        db,
        jane,
        DemoRecipe {
            title: "Fudgy Brownies",
            description: "Dense chocolate brownies with a crackly top.",
            ingredients: "200g dark chocolate\n175g butter\n3 eggs\n250g sugar\n100g flour\npinch of salt",
            instructions: "1. Melt chocolate and butter.\n2. Whisk eggs and sugar, fold everything together.\n3. Bake at 180C for 25 minutes.",
            prep_time: 15,
            cook_time: 25,
            servings: 12,
            category: "Desserts",
        },
    )
    .await?;

    ensure_rating(db, pancakes, jane, 5).await?;
    ensure_rating(db, carbonara, john, 4).await?;
    ensure_rating(db, brownies, john, 5).await?;

    ensure_comment(db, pancakes, jane, "Turned out great, the kids loved them.").await?;
    ensure_comment(db, carbonara, john, "Worked well with smoked pancetta too.").await?;

    info!("demo data ready");
    Ok(())
}

async fn ensure_user(
    db: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> anyhow::Result<Uuid> {
    sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .execute(db)
    .await?;

    let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_one(db)
        .await?;
    Ok(id)
}

async fn ensure_recipe(db: &PgPool, owner_id: Uuid, recipe: DemoRecipe) -> anyhow::Result<Uuid> {
    let existing =
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM recipes WHERE title = $1 AND user_id = $2")
            .bind(recipe.title)
            .bind(owner_id)
            .fetch_optional(db)
            .await?;
    if let Some(id) = existing {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO recipes
            (title, description, ingredients, instructions,
             prep_time, cook_time, servings, category, user_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        "#,
    )
    .bind(recipe.title)
    .bind(recipe.description)
    .bind(recipe.ingredients)
    .bind(recipe.instructions)
    .bind(recipe.prep_time)
    .bind(recipe.cook_time)
    .bind(recipe.servings)
    .bind(recipe.category)
    .bind(owner_id)
    .fetch_one(db)
    .await?;
    Ok(id)
}

async fn ensure_rating(
    db: &PgPool,
    recipe_id: Uuid,
    user_id: Uuid,
    rating: i32,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO ratings (recipe_id, user_id, rating)
        VALUES ($1, $2, $3)
        ON CONFLICT (recipe_id, user_id) DO NOTHING
        "#,
    )
    .bind(recipe_id)
    .bind(user_id)
    .bind(rating)
    .execute(db)
    .await?;
    Ok(())
}

async fn ensure_comment(
    db: &PgPool,
    recipe_id: Uuid,
    user_id: Uuid,
    content: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO comments (recipe_id, user_id, content)
        SELECT $1, $2, $3
        WHERE NOT EXISTS (
            SELECT 1 FROM comments
            WHERE recipe_id = $1 AND user_id = $2 AND content = $3
        )
        "#,
    )
    .bind(recipe_id)
    .bind(user_id)
    .bind(content)
    .execute(db)
    .await?;
    Ok(())
}
