use std::collections::BTreeMap;

use super::{Category, Product};

struct ProductSeed {
    id: &'static str,
    name: &'static str,
    category: Category,
    brand: &'static str,
    price: f64,
    description: &'static str,
    specs: &'static [(&'static str, &'static str)],
    features: &'static [&'static str],
    tags: &'static [&'static str],
}

impl From<&ProductSeed> for Product {
    fn from(seed: &ProductSeed) -> Self {
        Self {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            category: seed.category,
            brand: seed.brand.to_string(),
            price: seed.price,
            description: seed.description.to_string(),
            specs: seed
                .specs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<BTreeMap<_, _>>(),
            features: seed.features.iter().map(|f| (*f).to_string()).collect(),
            tags: seed.tags.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

pub(super) fn builtin_products() -> Vec<Product> {
    SEEDS.iter().map(Product::from).collect()
}

const SEEDS: &[ProductSeed] = &[
    // Phones
    ProductSeed {
        id: "phone_001",
        name: "iPhone 15 Pro",
        category: Category::Phone,
        brand: "Apple",
        price: 999.0,
        description: "Latest iPhone with A17 Pro chip, titanium design, and advanced camera system",
        specs: &[
            ("screen_size", "6.1 inches"),
            ("storage", "128GB"),
            ("ram", "8GB"),
            ("processor", "A17 Pro"),
            ("camera", "48MP main + 12MP ultra-wide + 12MP telephoto"),
            ("battery", "3274mAh"),
            ("os", "iOS 17"),
        ],
        features: &["5G", "Face ID", "Wireless charging", "Water resistant", "Titanium frame"],
        tags: &["premium", "camera", "gaming", "business", "photography"],
    },
    ProductSeed {
        id: "phone_002",
        name: "Samsung Galaxy S24 Ultra",
        category: Category::Phone,
        brand: "Samsung",
        price: 1299.0,
        description: "Premium Android flagship with S Pen, advanced AI features, and exceptional camera",
        specs: &[
            ("screen_size", "6.8 inches"),
            ("storage", "256GB"),
            ("ram", "12GB"),
            ("processor", "Snapdragon 8 Gen 3"),
            ("camera", "200MP main + 12MP ultra-wide + 50MP telephoto + 10MP telephoto"),
            ("battery", "5000mAh"),
            ("os", "Android 14"),
        ],
        features: &["5G", "S Pen", "Wireless charging", "Water resistant", "AI features"],
        tags: &["premium", "camera", "productivity", "business", "creativity"],
    },
    ProductSeed {
        id: "phone_003",
        name: "Google Pixel 8",
        category: Category::Phone,
        brand: "Google",
        price: 699.0,
        description: "AI-powered smartphone with exceptional camera and clean Android experience",
        specs: &[
            ("screen_size", "6.2 inches"),
            ("storage", "128GB"),
            ("ram", "8GB"),
            ("processor", "Google Tensor G3"),
            ("camera", "50MP main + 12MP ultra-wide"),
            ("battery", "4575mAh"),
            ("os", "Android 14"),
        ],
        features: &["5G", "AI camera", "Wireless charging", "Water resistant", "Google Assistant"],
        tags: &["camera", "AI", "mid-range", "photography", "clean UI"],
    },
    ProductSeed {
        id: "phone_004",
        name: "OnePlus 12",
        category: Category::Phone,
        brand: "OnePlus",
        price: 799.0,
        description: "Fast performance with Hasselblad camera system and rapid charging",
        specs: &[
            ("screen_size", "6.82 inches"),
            ("storage", "256GB"),
            ("ram", "16GB"),
            ("processor", "Snapdragon 8 Gen 3"),
            ("camera", "50MP main + 48MP ultra-wide + 64MP telephoto"),
            ("battery", "5400mAh"),
            ("os", "Android 14"),
        ],
        features: &["5G", "100W charging", "Wireless charging", "Water resistant", "Hasselblad camera"],
        tags: &["performance", "fast charging", "camera", "gaming", "value"],
    },
    // Laptops
    ProductSeed {
        id: "laptop_001",
        name: "MacBook Pro 14-inch",
        category: Category::Laptop,
        brand: "Apple",
        price: 1999.0,
        description: "Professional laptop with M3 Pro chip, perfect for creative work and development",
        specs: &[
            ("screen_size", "14.2 inches"),
            ("storage", "512GB SSD"),
            ("ram", "18GB"),
            ("processor", "M3 Pro"),
            ("gpu", "Integrated"),
            ("battery", "Up to 22 hours"),
            ("os", "macOS Sonoma"),
        ],
        features: &["Retina display", "Touch Bar", "Thunderbolt 4", "Backlit keyboard", "Force Touch trackpad"],
        tags: &["premium", "creative", "development", "business", "portable"],
    },
    ProductSeed {
        id: "laptop_002",
        name: "Dell XPS 13 Plus",
        category: Category::Laptop,
        brand: "Dell",
        price: 1499.0,
        description: "Ultra-slim premium Windows laptop with excellent performance and design",
        specs: &[
            ("screen_size", "13.4 inches"),
            ("storage", "512GB SSD"),
            ("ram", "16GB"),
            ("processor", "Intel Core i7-1360P"),
            ("gpu", "Intel Iris Xe"),
            ("battery", "Up to 12 hours"),
            ("os", "Windows 11"),
        ],
        features: &["InfinityEdge display", "Backlit keyboard", "Thunderbolt 4", "Fingerprint reader", "Premium build"],
        tags: &["premium", "business", "portable", "design", "professional"],
    },
    ProductSeed {
        id: "laptop_003",
        name: "Lenovo ThinkPad X1 Carbon",
        category: Category::Laptop,
        brand: "Lenovo",
        price: 1699.0,
        description: "Business-focused laptop with legendary ThinkPad reliability and security",
        specs: &[
            ("screen_size", "14 inches"),
            ("storage", "1TB SSD"),
            ("ram", "16GB"),
            ("processor", "Intel Core i7-1355U"),
            ("gpu", "Intel Iris Xe"),
            ("battery", "Up to 15 hours"),
            ("os", "Windows 11 Pro"),
        ],
        features: &["ThinkPad keyboard", "Fingerprint reader", "IR camera", "Thunderbolt 4", "Military-grade durability"],
        tags: &["business", "reliable", "security", "professional", "durable"],
    },
    ProductSeed {
        id: "laptop_004",
        name: "ASUS ROG Zephyrus G14",
        category: Category::Laptop,
        brand: "ASUS",
        price: 1299.0,
        description: "Gaming laptop with AMD Ryzen processor and dedicated graphics for gaming and content creation",
        specs: &[
            ("screen_size", "14 inches"),
            ("storage", "512GB SSD"),
            ("ram", "16GB"),
            ("processor", "AMD Ryzen 7 7735HS"),
            ("gpu", "NVIDIA RTX 4050"),
            ("battery", "Up to 8 hours"),
            ("os", "Windows 11"),
        ],
        features: &["144Hz display", "RGB keyboard", "Gaming performance", "Anime Matrix", "Portable gaming"],
        tags: &["gaming", "performance", "content creation", "portable", "RGB"],
    },
    // Tablets
    ProductSeed {
        id: "tablet_001",
        name: "iPad Pro 12.9-inch",
        category: Category::Tablet,
        brand: "Apple",
        price: 1099.0,
        description: "Professional tablet with M2 chip, perfect for creative work and productivity",
        specs: &[
            ("screen_size", "12.9 inches"),
            ("storage", "128GB"),
            ("ram", "8GB"),
            ("processor", "M2"),
            ("camera", "12MP wide + 10MP ultra-wide"),
            ("battery", "Up to 10 hours"),
            ("os", "iPadOS 17"),
        ],
        features: &["Liquid Retina XDR display", "Apple Pencil support", "Magic Keyboard", "5G optional", "Face ID"],
        tags: &["premium", "creative", "productivity", "professional", "large screen"],
    },
    ProductSeed {
        id: "tablet_002",
        name: "Samsung Galaxy Tab S9 Ultra",
        category: Category::Tablet,
        brand: "Samsung",
        price: 1199.0,
        description: "Large Android tablet with S Pen and exceptional multimedia experience",
        specs: &[
            ("screen_size", "14.6 inches"),
            ("storage", "256GB"),
            ("ram", "12GB"),
            ("processor", "Snapdragon 8 Gen 2"),
            ("camera", "13MP + 8MP dual"),
            ("battery", "11200mAh"),
            ("os", "Android 13"),
        ],
        features: &["AMOLED display", "S Pen included", "5G optional", "Multi-window", "DeX mode"],
        tags: &["large screen", "multimedia", "productivity", "S Pen", "entertainment"],
    },
    ProductSeed {
        id: "tablet_003",
        name: "Microsoft Surface Pro 9",
        category: Category::Tablet,
        brand: "Microsoft",
        price: 999.0,
        description: "2-in-1 tablet that transforms into a laptop with full Windows experience",
        specs: &[
            ("screen_size", "13 inches"),
            ("storage", "256GB SSD"),
            ("ram", "16GB"),
            ("processor", "Intel Core i5-1235U"),
            ("camera", "10MP rear + 5MP front"),
            ("battery", "Up to 15.5 hours"),
            ("os", "Windows 11"),
        ],
        features: &["2-in-1 design", "Surface Pen", "Type Cover", "Kickstand", "Full Windows"],
        tags: &["2-in-1", "productivity", "business", "versatile", "Windows"],
    },
    ProductSeed {
        id: "tablet_004",
        name: "Amazon Fire HD 10",
        category: Category::Tablet,
        brand: "Amazon",
        price: 149.0,
        description: "Affordable tablet perfect for entertainment, reading, and basic tasks",
        specs: &[
            ("screen_size", "10.1 inches"),
            ("storage", "32GB"),
            ("ram", "3GB"),
            ("processor", "Octa-core"),
            ("camera", "5MP rear + 2MP front"),
            ("battery", "Up to 12 hours"),
            ("os", "Fire OS"),
        ],
        features: &["HD display", "Alexa integration", "Expandable storage", "Kid-friendly", "Affordable"],
        tags: &["budget", "entertainment", "reading", "kids", "value"],
    },
];
