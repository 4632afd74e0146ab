//! Demo catalog: a few Russian avant-garde artists, two museums and three
//! paintings.

use crate::gallery_store::{
    BatchPainting, CatalogBatch, GalleryCounts, GalleryResult, NewArtist, NewMuseum, NewPainting,
    SqliteGalleryStore,
};

fn artist(short: &str, long: &str, dob: &str, dob_place: &str, dod: &str, dod_place: &str) -> NewArtist {
    NewArtist {
        artist_short_name: short.to_string(),
        artist_long_name: long.to_string(),
        dob: Some(dob.to_string()),
        dob_place: Some(dob_place.to_string()),
        dod: Some(dod.to_string()),
        dod_place: Some(dod_place.to_string()),
    }
}

fn strings(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|s| s.to_string()).collect())
}

pub fn demo_catalog() -> CatalogBatch {
    let artists = vec![
        artist(
            "Гончарова Н.С.",
            "Гончарова Наталья Сергеевна",
            "1881-07-03",
            "д.Нагаево Тульской губ",
            "1962-10-17",
            "Париж",
        ),
        artist(
            "Родченко А.М.",
            "Родченко Александр Михайлович",
            "1891-12-05",
            "Санкт-Петербург",
            "1956-12-03",
            "Москва",
        ),
        artist(
            "Удальцова Н.А.",
            "Удальцова Надежда Андреевна",
            "1885-12-29",
            "Орёл",
            "1961-01-25",
            "Москва",
        ),
    ];

    let museums = vec![
        NewMuseum {
            name: "Государственный Русский музей".to_string(),
            name_unique: "russian_museum".to_string(),
            contact: Some("+7-812-123-45-67".to_string()),
            profile: Some("russian-museum.webp".to_string()),
            profile_path: Some(
                "https://art-api.srvdev.ru/storage/app/museum-images/russian-museum.webp"
                    .to_string(),
            ),
            city: Some("Санкт-Петербург".to_string()),
            state: Some("Санкт-Петербург".to_string()),
            country: Some("Россия".to_string()),
            country_code: Some(7),
            zipcode: Some(191186),
            website: Some("https://rusmuseum.ru".to_string()),
        },
        NewMuseum {
            name: "Государственная Третьяковская галерея".to_string(),
            name_unique: "tretyakov_gallery".to_string(),
            contact: Some("+7-495-123-45-67".to_string()),
            profile: Some("tretyakov-gallery.webp".to_string()),
            profile_path: Some(
                "https://art-api.srvdev.ru/storage/app/museum-images/tretyakov-gallery.webp"
                    .to_string(),
            ),
            city: Some("Москва".to_string()),
            state: Some("Москва".to_string()),
            country: Some("Россия".to_string()),
            country_code: Some(7),
            zipcode: Some(119017),
            website: Some("https://tretyakovgallery.ru".to_string()),
        },
    ];

    let painting = |title: &str, genre: &str, size: &str, year: i32, period: &str, style: &[&str]| {
        NewPainting {
            title: title.to_string(),
            painting_type: Some("живопись".to_string()),
            genre: Some(genre.to_string()),
            materials: strings(&["холст", "масло"]),
            size: Some(size.to_string()),
            year: Some(year),
            period: Some(period.to_string()),
            style: strings(style),
            ..Default::default()
        }
    };

    let paintings = vec![
        BatchPainting {
            painting: painting(
                "Велосипедист",
                "Бытовой",
                "75 на 105",
                1913,
                "Конец XIX - начало XX века",
                &["кубофутуризм", "авангард"],
            ),
            artist: 0,
            museum: 0,
        },
        BatchPainting {
            painting: painting(
                "Черное на черном",
                "Абстрактный",
                "80 на 60",
                1918,
                "Русский авангард",
                &["супрематизм", "конструктивизм"],
            ),
            artist: 1,
            museum: 1,
        },
        BatchPainting {
            painting: painting(
                "Ресторан",
                "Городской пейзаж",
                "65 на 81",
                1915,
                "Русский авангард",
                &["кубизм", "футуризм"],
            ),
            artist: 2,
            museum: 0,
        },
    ];

    CatalogBatch {
        artists,
        museums,
        paintings,
    }
}

/// Inserts the demo catalog in one transaction.
pub fn seed_demo_data(store: &SqliteGalleryStore) -> GalleryResult<GalleryCounts> {
    store.import_batch(&demo_catalog())
}
