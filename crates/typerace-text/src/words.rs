//! Per-language word banks.
//!
//! Four categories per language — common/function words, nouns, verbs,
//! adjectives — pooled uniformly with no grammar. Picking is uniform over
//! the concatenation of the categories, with replacement.

use rand::Rng;
use typerace_core::Language;

const ENGLISH_COMMON: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "I",
    "it", "for", "not", "on", "with", "he", "as", "you", "do", "at",
    "this", "but", "his", "by", "from", "they", "we", "say", "her", "she",
    "or", "an", "will", "my", "one", "all", "would", "there", "their", "what",
];

const ENGLISH_NOUNS: &[&str] = &[
    "time", "person", "year", "way", "day", "thing", "man", "world", "life", "hand",
    "part", "child", "eye", "woman", "place", "work", "week", "case", "point", "government",
    "company", "number", "group", "problem", "fact", "program", "question", "system", "service", "water",
    "computer", "phone", "internet", "website", "email", "code", "developer", "software", "application", "data",
];

const ENGLISH_VERBS: &[&str] = &[
    "be", "have", "do", "say", "get", "make", "go", "know", "take", "see",
    "come", "think", "look", "want", "give", "use", "find", "tell", "ask", "work",
    "seem", "feel", "try", "leave", "call", "keep", "let", "begin", "help", "show",
    "write", "build", "create", "develop", "design", "program", "test", "debug", "deploy", "learn",
];

const ENGLISH_ADJECTIVES: &[&str] = &[
    "good", "new", "first", "last", "long", "great", "little", "own", "other", "old",
    "right", "big", "high", "different", "small", "large", "next", "early", "young", "important",
    "few", "public", "bad", "same", "able", "quick", "fast", "slow", "easy", "hard",
    "simple", "complex", "modern", "digital", "online", "virtual", "smart", "efficient", "powerful", "advanced",
];

const INDONESIAN_COMMON: &[&str] = &[
    "yang", "ini", "itu", "dan", "di", "ke", "dari", "untuk", "dengan", "pada",
    "adalah", "akan", "ada", "atau", "juga", "sudah", "saya", "tidak", "kamu", "mereka",
    "kami", "kita", "dia", "apa", "siapa", "kapan", "dimana", "mengapa", "bagaimana", "tetapi",
    "karena", "jika", "maka", "bisa", "dapat", "harus", "boleh", "mau", "ingin", "perlu",
];

const INDONESIAN_NOUNS: &[&str] = &[
    "waktu", "orang", "tahun", "hari", "bulan", "minggu", "dunia", "negara", "kota", "rumah",
    "sekolah", "kantor", "teman", "keluarga", "anak", "bapak", "ibu", "guru", "siswa", "mahasiswa",
    "pekerjaan", "masalah", "solusi", "kesempatan", "tujuan", "rencana", "hasil", "proses", "sistem", "program",
    "komputer", "telepon", "internet", "aplikasi", "website", "email", "data", "kode", "teknologi", "software",
];

const INDONESIAN_VERBS: &[&str] = &[
    "pergi", "datang", "lihat", "baca", "tulis", "bicara", "dengar", "makan", "minum", "tidur",
    "bangun", "kerja", "belajar", "main", "buat", "ambil", "beri", "kirim", "terima", "tanya",
    "jawab", "cari", "temukan", "mulai", "selesai", "coba", "pikir", "ingat", "lupa", "tahu",
    "pakai", "simpan", "hapus", "ubah", "tambah", "kurang", "bagi", "kali", "hitung", "ukur",
];

const INDONESIAN_ADJECTIVES: &[&str] = &[
    "baik", "buruk", "besar", "kecil", "tinggi", "rendah", "panjang", "pendek", "luas", "sempit",
    "cepat", "lambat", "mudah", "sulit", "baru", "lama", "muda", "tua", "cantik", "tampan",
    "pintar", "bodoh", "rajin", "malas", "kuat", "lemah", "sehat", "sakit", "senang", "sedih",
    "penting", "berguna", "modern", "canggih", "praktis", "efisien", "efektif", "digital", "online", "virtual",
];

/// The pooled categories for a language.
fn categories(language: Language) -> [&'static [&'static str]; 4] {
    match language {
        Language::English => [ENGLISH_COMMON, ENGLISH_NOUNS, ENGLISH_VERBS, ENGLISH_ADJECTIVES],
        Language::Indonesian => [
            INDONESIAN_COMMON,
            INDONESIAN_NOUNS,
            INDONESIAN_VERBS,
            INDONESIAN_ADJECTIVES,
        ],
    }
}

/// Draws one word uniformly from the pooled bank.
pub(crate) fn pick(language: Language, rng: &mut impl Rng) -> &'static str {
    let cats = categories(language);
    let total: usize = cats.iter().map(|c| c.len()).sum();
    let mut idx = rng.random_range(0..total);
    for cat in cats {
        if idx < cat.len() {
            return cat[idx];
        }
        idx -= cat.len();
    }
    unreachable!("index drawn within total pool size")
}

/// True if `word` appears anywhere in the language's bank. Test helper.
#[cfg(test)]
pub(crate) fn contains(language: Language, word: &str) -> bool {
    categories(language).iter().any(|c| c.contains(&word))
}
