//! Static catalog of example programs served to the editor frontend.
//! Loaded into read-only state once; nothing here mutates after startup.

use serde::Serialize;

use crate::types::{Language, ToolchainMode};

/// One ready-to-run example program.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SampleProgram {
    pub name: &'static str,
    pub mode: ToolchainMode,
    pub language: Language,
    pub code: &'static str,
}

/// The example catalog, keyed by stable names.
pub fn sample_programs() -> &'static [SampleProgram] {
    SAMPLES
}

const SAMPLES: &[SampleProgram] = &[
    SampleProgram {
        name: "hello_world",
        mode: ToolchainMode::ThreadParallel,
        language: Language::C,
        code: r#"#include <stdio.h>
#include <omp.h>

int main() {
    #pragma omp parallel
    {
        int thread_id = omp_get_thread_num();
        int total_threads = omp_get_num_threads();
        printf("Hello from thread %d of %d\n", thread_id, total_threads);
    }
    return 0;
}
"#,
    },
    SampleProgram {
        name: "array_sum",
        mode: ToolchainMode::ThreadParallel,
        language: Language::C,
        code: r#"#include <stdio.h>
#include <omp.h>

int main() {
    int n = 1000;
    int arr[1000];
    int sum = 0;

    for (int i = 0; i < n; i++) {
        arr[i] = i + 1;
    }

    #pragma omp parallel for reduction(+:sum)
    for (int i = 0; i < n; i++) {
        sum += arr[i];
    }

    printf("Sum of 1 to %d = %d\n", n, sum);
    printf("Expected: %d\n", (n * (n + 1)) / 2);
    return 0;
}
"#,
    },
    SampleProgram {
        name: "private_vs_shared",
        mode: ToolchainMode::ThreadParallel,
        language: Language::C,
        code: r#"#include <stdio.h>
#include <omp.h>

int main() {
    int shared_var = 0;
    int private_var = 100;

    printf("Before parallel region:\n");
    printf("shared_var = %d, private_var = %d\n\n", shared_var, private_var);

    #pragma omp parallel num_threads(4) private(private_var) shared(shared_var)
    {
        int tid = omp_get_thread_num();
        private_var = tid * 10;

        #pragma omp critical
        {
            shared_var += tid;
            printf("Thread %d: private_var = %d, shared_var = %d\n",
                   tid, private_var, shared_var);
        }
    }

    printf("\nAfter parallel region:\n");
    printf("shared_var = %d, private_var = %d\n", shared_var, private_var);
    return 0;
}
"#,
    },
    SampleProgram {
        name: "critical_section",
        mode: ToolchainMode::ThreadParallel,
        language: Language::C,
        code: r#"#include <stdio.h>
#include <omp.h>

int main() {
    int counter = 0;

    printf("Without critical section (race condition):\n");
    #pragma omp parallel for num_threads(4)
    for (int i = 0; i < 1000; i++) {
        counter++;
    }
    printf("Counter = %d (should be 1000)\n\n", counter);

    counter = 0;
    printf("With critical section:\n");
    #pragma omp parallel for num_threads(4)
    for (int i = 0; i < 1000; i++) {
        #pragma omp critical
        counter++;
    }
    printf("Counter = %d (correct!)\n", counter);
    return 0;
}
"#,
    },
    SampleProgram {
        name: "mpi_hello",
        mode: ToolchainMode::ProcessParallel,
        language: Language::C,
        code: r#"#include <mpi.h>
#include <stdio.h>

int main(int argc, char **argv) {
    MPI_Init(&argc, &argv);
    int rank = 0;
    int size = 0;
    MPI_Comm_rank(MPI_COMM_WORLD, &rank);
    MPI_Comm_size(MPI_COMM_WORLD, &size);
    printf("Hello from rank %d of %d\n", rank, size);
    MPI_Finalize();
    return 0;
}
"#,
    },
    SampleProgram {
        name: "cpp_hello",
        mode: ToolchainMode::ThreadParallel,
        language: Language::Cpp,
        code: r#"#include <iostream>
#include <omp.h>

int main() {
    #pragma omp parallel
    {
        int thread_id = omp_get_thread_num();
        int total_threads = omp_get_num_threads();
        #pragma omp critical
        std::cout << "Hello from thread " << thread_id << " of " << total_threads << std::endl;
    }
    return 0;
}
"#,
    },
    SampleProgram {
        name: "mpi_cpp_hello",
        mode: ToolchainMode::ProcessParallel,
        language: Language::Cpp,
        code: r#"#include <mpi.h>
#include <iostream>

int main(int argc, char **argv) {
    MPI_Init(&argc, &argv);
    int rank, size;
    MPI_Comm_rank(MPI_COMM_WORLD, &rank);
    MPI_Comm_size(MPI_COMM_WORLD, &size);
    std::cout << "Hello from rank " << rank << " of " << size << std::endl;
    MPI_Finalize();
    return 0;
}
"#,
    },
];
